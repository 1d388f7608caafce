//! Builds the one line per device report from a snapshot
//!
//! ```
//! use usbsnap::profiler::{DeviceRecord, SnapshotDump};
//! use usbsnap::report::{write_report, ReportSettings};
//! use usbsnap::usb::{DeviceDescriptor, Speed};
//!
//! let dump = SnapshotDump {
//!     devices: vec![DeviceRecord {
//!         bus_number: 1,
//!         address: 7,
//!         port_numbers: vec![12, 4],
//!         speed: Speed::FullSpeed,
//!         max_iso_packet_size: None,
//!         descriptor: Some(DeviceDescriptor {
//!             descriptor_type: 1,
//!             usb_version: 0x0200,
//!             class_code: 0,
//!             sub_class_code: 0,
//!             protocol_code: 0,
//!             max_packet_size: 8,
//!             vendor_id: 0x0403,
//!             product_id: 0x6015,
//!             device_version: 0x1000,
//!             manufacturer_string_index: 1,
//!             serial_number_string_index: 3,
//!             num_configurations: 1,
//!         }),
//!     }],
//!     ..Default::default()
//! };
//!
//! let mut out = Vec::new();
//! write_report(&mut out, dump.len(), dump.iter(), &ReportSettings::default()).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "Thar be 1 USB devices.\n\
//!      USB class:   ? | speed:    12Mbps | cannot read packet size | 0403:6015 (bus 1, device 7) | port number: 12.4\n"
//! );
//! ```
use std::io::Write;

use crate::display;
use crate::error::{Error, ErrorKind, Result};
use crate::profiler::UsbOperations;
use crate::usb::{self, DeviceDescriptor, Speed, SpeedMode};

/// Most devices reported from one snapshot; the rest are truncated
pub const MAX_DEVICES: usize = 255;
/// Endpoint queried for the isochronous max packet size
pub const ISO_PACKET_ENDPOINT: u8 = 0;

/// What to do when a device descriptor cannot be read
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFailurePolicy {
    /// Stop the report and return the error
    #[default]
    Abort,
    /// Log, skip the device and continue
    Skip,
}

/// Settings for [`write_report`]
#[derive(Debug, Default, Clone)]
pub struct ReportSettings {
    /// Presentation of the speed label
    pub speed_mode: SpeedMode,
    /// Print the device descriptor block after each device line
    pub dump_descriptors: bool,
    /// Behaviour on descriptor read failure
    pub descriptor_failure: DescriptorFailurePolicy,
}

/// Counts from one [`write_report`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Snapshot length
    pub total: usize,
    /// Device lines written
    pub listed: usize,
    /// Devices skipped for unreadable descriptors
    pub skipped: usize,
    /// Snapshot was longer than [`MAX_DEVICES`]
    pub truncated: bool,
}

/// Everything printed on one report line, gathered from a single device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    /// Device descriptor the line is based on
    pub descriptor: DeviceDescriptor,
    /// Negotiated speed
    pub speed: Speed,
    /// How `speed` is labelled
    pub speed_mode: SpeedMode,
    /// `None` if the host could not report it
    pub max_iso_packet_size: Option<u32>,
    /// Bus number
    pub bus_number: u8,
    /// Device address on bus
    pub address: u8,
    /// Port path; empty for root hubs or if unavailable
    pub port_numbers: Vec<u8>,
}

impl DeviceReport {
    /// Gather the report fields from `device`
    ///
    /// Only a failed descriptor read is an error ([`ErrorKind::DescriptorRead`]); a missing packet size or port path is recorded as absent.
    pub fn build<D: UsbOperations>(device: &D, speed_mode: SpeedMode) -> Result<DeviceReport> {
        let bus_number = device.bus_number();
        let address = device.address();

        let descriptor = device.device_descriptor().map_err(|e| {
            Error::new(
                ErrorKind::DescriptorRead,
                &format!(
                    "Failed to get device descriptor for bus {} device {}: {:#}",
                    bus_number, address, e
                ),
            )
        })?;

        let max_iso_packet_size = match device.max_iso_packet_size(ISO_PACKET_ENDPOINT) {
            Ok(size) => Some(size),
            Err(e) => {
                log::debug!(
                    "Max iso packet size unavailable for bus {} device {}: {:#}",
                    bus_number,
                    address,
                    e
                );
                None
            }
        };

        let port_numbers = device.port_numbers().unwrap_or_else(|e| {
            log::debug!(
                "Port path unavailable for bus {} device {}: {:#}",
                bus_number,
                address,
                e
            );
            Vec::new()
        });

        log::trace!(
            "Built report for {} {:04x}:{:04x}",
            usb::get_port_path(bus_number, &port_numbers),
            descriptor.vendor_id,
            descriptor.product_id
        );

        Ok(DeviceReport {
            descriptor,
            speed: device.speed(),
            speed_mode,
            max_iso_packet_size,
            bus_number,
            address,
            port_numbers,
        })
    }

    /// Label of the device class
    pub fn class_label(&self) -> &'static str {
        usb::class_label(self.descriptor.class_code)
    }

    /// Label of the negotiated speed
    pub fn speed_label(&self) -> &'static str {
        self.speed.label(self.speed_mode)
    }
}

/// Write the header and one line per device for a snapshot of `total` devices
///
/// At most [`MAX_DEVICES`] devices are consumed from `devices`. Lines are written as they are built so output written before an aborting descriptor failure is kept.
pub fn write_report<W, I, D>(
    writer: &mut W,
    total: usize,
    devices: I,
    settings: &ReportSettings,
) -> Result<ReportSummary>
where
    W: Write,
    I: IntoIterator<Item = D>,
    D: UsbOperations,
{
    let mut summary = ReportSummary {
        total,
        truncated: total > MAX_DEVICES,
        ..Default::default()
    };

    writeln!(writer, "Thar be {} USB devices.", total)?;

    if summary.truncated {
        log::warn!(
            "Snapshot has {} devices, only the first {} will be reported",
            total,
            MAX_DEVICES
        );
    }

    for device in devices.into_iter().take(MAX_DEVICES) {
        let report = match DeviceReport::build(&device, settings.speed_mode) {
            Ok(r) => r,
            Err(e)
                if e.kind() == ErrorKind::DescriptorRead
                    && settings.descriptor_failure == DescriptorFailurePolicy::Skip =>
            {
                log::warn!("Skipping device: {:#}", e);
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        writeln!(writer, "{}", report)?;
        if settings.dump_descriptors {
            display::write_descriptor(writer, &report.descriptor)?;
        }
        summary.listed += 1;
    }

    log::debug!("Report finished: {:?}", summary);

    Ok(summary)
}
