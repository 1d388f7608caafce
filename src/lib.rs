//! Snapshot the USB devices visible to the host and report class, speed, IDs and port path for each, one line per device.
//!
//! The report is built from any snapshot of [`profiler::UsbOperations`] devices: a live libusb enumeration ([`profiler::libusb::LibUsbSnapshot`], 'libusb' feature) or a [`profiler::SnapshotDump`] read from json.
#![warn(missing_docs)]
use simple_logger::SimpleLogger;

pub mod config;
pub mod display;
pub mod error;
pub mod profiler;
pub mod report;
pub mod usb;

/// Set usbsnap module and binary log level
pub fn set_log_level(debug: u8) -> crate::error::Result<()> {
    match debug {
        // just use env if not passed
        0 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Error.to_level_filter())
            .env(),
        1 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Info.to_level_filter()),
        2 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Debug.to_level_filter()),
        _ => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Trace.to_level_filter()),
    }
    .init()
    .map_err(|e| {
        crate::error::Error::new(
            crate::error::ErrorKind::Other("simple_logger"),
            &format!("Failed to set log level: {}", e),
        )
    })?;

    #[cfg(feature = "libusb")]
    profiler::libusb::set_log_level(debug);

    Ok(())
}
