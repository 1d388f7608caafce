//! System USB profiler for getting a snapshot of the USB devices attached to the host
//!
//! Devices are reached through the [`UsbOperations`] trait so that the report can be built from a live libusb [`libusb::LibUsbSnapshot`] or from a [`SnapshotDump`] previously written with `--json`.
//!
//! ```no_run
//! use usbsnap::profiler::SnapshotDump;
//! use usbsnap::report::{write_report, ReportSettings};
//!
//! let dump = SnapshotDump::from_file("snapshot.json").unwrap();
//! let mut out = std::io::stdout();
//! write_report(&mut out, dump.total(), dump.iter(), &ReportSettings::default()).unwrap();
//! ```
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fs::File;
use std::io::{BufReader, Read};

use crate::error::{Error, ErrorKind, Result};
use crate::report::{ISO_PACKET_ENDPOINT, MAX_DEVICES};
use crate::usb::{self, DeviceDescriptor, Speed};

#[cfg(feature = "libusb")]
pub mod libusb;

/// Device operations required to report on one device of a snapshot
///
/// Handles are only valid while the snapshot that produced them is alive.
pub trait UsbOperations {
    /// Read the standard device descriptor
    fn device_descriptor(&self) -> Result<DeviceDescriptor>;
    /// Negotiated speed
    fn speed(&self) -> Speed;
    /// Isochronous max packet size of `endpoint`
    ///
    /// Returns [`ErrorKind::PacketSizeUnavailable`] if the endpoint does not exist or the platform cannot report it
    fn max_iso_packet_size(&self, endpoint: u8) -> Result<u32>;
    /// Bus the device is attached to
    fn bus_number(&self) -> u8;
    /// Address of the device on its bus
    fn address(&self) -> u8;
    /// Hub port numbers from the root hub to the device, at most 7 deep
    fn port_numbers(&self) -> Result<Vec<u8>>;
}

impl<T: UsbOperations + ?Sized> UsbOperations for &T {
    fn device_descriptor(&self) -> Result<DeviceDescriptor> {
        (**self).device_descriptor()
    }

    fn speed(&self) -> Speed {
        (**self).speed()
    }

    fn max_iso_packet_size(&self, endpoint: u8) -> Result<u32> {
        (**self).max_iso_packet_size(endpoint)
    }

    fn bus_number(&self) -> u8 {
        (**self).bus_number()
    }

    fn address(&self) -> u8 {
        (**self).address()
    }

    fn port_numbers(&self) -> Result<Vec<u8>> {
        (**self).port_numbers()
    }
}

/// What was read from one device, serializable so a snapshot can be replayed with `--from-json`
///
/// A `None` descriptor or packet size records that the read failed.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Bus number
    pub bus_number: u8,
    /// Device address on bus
    pub address: u8,
    /// Port path from root hub; empty for root hubs or if it could not be read
    #[serde(default)]
    pub port_numbers: Vec<u8>,
    /// Negotiated speed
    #[serde(default)]
    pub speed: Speed,
    /// Isochronous max packet size of endpoint 0
    pub max_iso_packet_size: Option<u32>,
    /// Device descriptor
    pub descriptor: Option<DeviceDescriptor>,
}

impl DeviceRecord {
    /// Read everything the report uses from `device`; failed reads are recorded as missing rather than returned
    pub fn capture<D: UsbOperations>(device: &D) -> DeviceRecord {
        let bus_number = device.bus_number();
        let address = device.address();
        log::trace!("Capturing bus {} device {}", bus_number, address);

        DeviceRecord {
            bus_number,
            address,
            port_numbers: device.port_numbers().unwrap_or_else(|e| {
                log::debug!("No port path for bus {} device {}: {}", bus_number, address, e);
                Vec::new()
            }),
            speed: device.speed(),
            max_iso_packet_size: device.max_iso_packet_size(ISO_PACKET_ENDPOINT).ok(),
            descriptor: match device.device_descriptor() {
                Ok(d) => Some(d),
                Err(e) => {
                    log::warn!(
                        "Failed to get device descriptor for bus {} device {}: {}",
                        bus_number,
                        address,
                        e
                    );
                    None
                }
            },
        }
    }

    /// sysfs style name of the device, `1-1.3`
    pub fn port_path(&self) -> String {
        usb::get_port_path(self.bus_number, &self.port_numbers)
    }
}

impl UsbOperations for DeviceRecord {
    fn device_descriptor(&self) -> Result<DeviceDescriptor> {
        self.descriptor.ok_or_else(|| {
            Error::new(
                ErrorKind::DescriptorRead,
                &format!("no device descriptor recorded for {}", self.port_path()),
            )
        })
    }

    fn speed(&self) -> Speed {
        self.speed
    }

    fn max_iso_packet_size(&self, endpoint: u8) -> Result<u32> {
        match (endpoint, self.max_iso_packet_size) {
            (ISO_PACKET_ENDPOINT, Some(size)) => Ok(size),
            _ => Err(Error::new(
                ErrorKind::PacketSizeUnavailable,
                &format!(
                    "no max iso packet size recorded for endpoint {} of {}",
                    endpoint,
                    self.port_path()
                ),
            )),
        }
    }

    fn bus_number(&self) -> u8 {
        self.bus_number
    }

    fn address(&self) -> u8 {
        self.address
    }

    fn port_numbers(&self) -> Result<Vec<u8>> {
        Ok(self.port_numbers.clone())
    }
}

/// An enumeration snapshot held as [`DeviceRecord`]s, in enumeration order
#[skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDump {
    /// Devices in the order the host listed them
    pub devices: Vec<DeviceRecord>,
    /// Length of the host snapshot when it had more devices than were captured
    pub total_devices: Option<usize>,
}

impl SnapshotDump {
    /// Capture at most [`MAX_DEVICES`] devices from a snapshot
    ///
    /// The rest are counted so a replay reports the same total as the host did.
    pub fn capture<I, D>(devices: I) -> SnapshotDump
    where
        I: IntoIterator<Item = D>,
        D: UsbOperations,
    {
        let mut records = Vec::new();
        let mut total = 0;

        for device in devices {
            if total < MAX_DEVICES {
                records.push(DeviceRecord::capture(&device));
            }
            total += 1;
        }

        let total_devices = if total > MAX_DEVICES {
            log::warn!(
                "Snapshot has {} devices, only the first {} will be captured",
                total,
                MAX_DEVICES
            );
            Some(total)
        } else {
            None
        };

        SnapshotDump {
            devices: records,
            total_devices,
        }
    }

    /// Parse a dump from a json string
    pub fn from_json(data: &str) -> Result<SnapshotDump> {
        serde_json::from_str::<SnapshotDump>(data).map_err(Error::from)
    }

    /// Read a dump previously written with `--json`
    pub fn from_file(file_path: &str) -> Result<SnapshotDump> {
        let f = File::open(file_path).map_err(|e| {
            Error::new(
                ErrorKind::Io(e.kind()),
                &format!("Failed to open snapshot dump {}: {}", file_path, e),
            )
        })?;
        let mut br = BufReader::new(f);
        let mut data = String::new();
        br.read_to_string(&mut data)?;

        let dump = Self::from_json(&data)?;
        log::debug!("Loaded {} devices from {}", dump.len(), file_path);
        Ok(dump)
    }

    /// Number of devices in the snapshot
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Snapshot contains no devices
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Number of devices the host listed, which can exceed [`SnapshotDump::len`] for a capped capture
    pub fn total(&self) -> usize {
        self.total_devices.unwrap_or(self.devices.len()).max(self.devices.len())
    }

    /// Devices in enumeration order
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceRecord> {
        self.devices.iter()
    }
}
