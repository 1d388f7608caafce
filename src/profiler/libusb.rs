//! Uses rusb (upto date libusb fork) to take a snapshot of the system USB devices. Requires 'libusb' feature.
//!
//! The libusb context and device list live inside [`LibUsbSnapshot`] and are released together when it is dropped, so no device handle outlives the list it came from.
use super::*;
use crate::usb;
use rusb as libusb;
use rusb::UsbContext;
use std::mem;

/// A single libusb enumeration: the device list owned together with the context that produced it
pub struct LibUsbSnapshot {
    list: libusb::DeviceList<libusb::Context>,
}

/// Set log level for rusb
pub fn set_log_level(debug: u8) {
    let log_level = match debug {
        0 => rusb::LogLevel::None,
        1 => rusb::LogLevel::Warning,
        2 => rusb::LogLevel::Info,
        _ => rusb::LogLevel::Debug,
    };

    rusb::set_log_level(log_level);
}

/// Covert to our crate speed
impl From<libusb::Speed> for usb::Speed {
    fn from(libusb: libusb::Speed) -> Self {
        match libusb {
            libusb::Speed::SuperPlus => usb::Speed::SuperSpeedPlus,
            libusb::Speed::Super => usb::Speed::SuperSpeed,
            libusb::Speed::High => usb::Speed::HighSpeed,
            libusb::Speed::Full => usb::Speed::FullSpeed,
            libusb::Speed::Low => usb::Speed::LowSpeed,
            libusb::Speed::Unknown => usb::Speed::Unknown,
            #[allow(unreachable_patterns)]
            _ => usb::Speed::Unrecognised,
        }
    }
}

/// BCD fields are copied as libusb read them; rusb's decoded `Version` cannot hold non-BCD values
impl From<&libusb::ffi::libusb_device_descriptor> for DeviceDescriptor {
    fn from(desc: &libusb::ffi::libusb_device_descriptor) -> Self {
        DeviceDescriptor {
            descriptor_type: desc.bDescriptorType,
            usb_version: desc.bcdUSB,
            class_code: desc.bDeviceClass,
            sub_class_code: desc.bDeviceSubClass,
            protocol_code: desc.bDeviceProtocol,
            max_packet_size: desc.bMaxPacketSize0,
            vendor_id: desc.idVendor,
            product_id: desc.idProduct,
            device_version: desc.bcdDevice,
            manufacturer_string_index: desc.iManufacturer,
            serial_number_string_index: desc.iSerialNumber,
            num_configurations: desc.bNumConfigurations,
        }
    }
}

impl<T: libusb::UsbContext> UsbOperations for libusb::Device<T> {
    /// Raw `libusb_get_device_descriptor` rather than rusb's wrapper so `bcdUSB` and `bcdDevice` are not decoded
    fn device_descriptor(&self) -> Result<DeviceDescriptor> {
        let mut desc = mem::MaybeUninit::<libusb::ffi::libusb_device_descriptor>::uninit();
        // SAFETY: `self` holds a reference on the libusb device and `desc` is only read after libusb reports success
        let ret =
            unsafe { libusb::ffi::libusb_get_device_descriptor(self.as_raw(), desc.as_mut_ptr()) };

        if ret != 0 {
            return Err(Error::new(
                ErrorKind::DescriptorRead,
                &format!("libusb: ERROR {} - Failed to get device descriptor", ret),
            ));
        }

        // SAFETY: libusb filled the descriptor
        let desc = unsafe { desc.assume_init() };
        Ok(DeviceDescriptor::from(&desc))
    }

    fn speed(&self) -> usb::Speed {
        usb::Speed::from(libusb::Device::speed(self))
    }

    /// rusb has no wrapper for `libusb_get_max_iso_packet_size` so call it directly
    fn max_iso_packet_size(&self, endpoint: u8) -> Result<u32> {
        // SAFETY: `self` holds a reference on the libusb device for the duration of the call
        let ret = unsafe { libusb::ffi::libusb_get_max_iso_packet_size(self.as_raw(), endpoint) };

        match ret {
            n if n >= 0 => Ok(n as u32),
            libusb::ffi::constants::LIBUSB_ERROR_NOT_FOUND => Err(Error::new(
                ErrorKind::PacketSizeUnavailable,
                &format!("endpoint {:#04x} not found", endpoint),
            )),
            libusb::ffi::constants::LIBUSB_ERROR_OTHER => Err(Error::new(
                ErrorKind::PacketSizeUnavailable,
                "max iso packet size not supported by platform",
            )),
            e => Err(Error::new(
                ErrorKind::LibUSB,
                &format!("libusb_get_max_iso_packet_size returned {}", e),
            )),
        }
    }

    fn bus_number(&self) -> u8 {
        libusb::Device::bus_number(self)
    }

    fn address(&self) -> u8 {
        libusb::Device::address(self)
    }

    fn port_numbers(&self) -> Result<Vec<u8>> {
        libusb::Device::port_numbers(self).map_err(|e| {
            Error::new(
                ErrorKind::PortPath,
                &format!("Failed to get port numbers: {}", e),
            )
        })
    }
}

impl LibUsbSnapshot {
    /// Start a libusb context and list the devices visible to it
    ///
    /// Any failure here is [`ErrorKind::Initialization`]; nothing has been reported yet.
    pub fn acquire() -> Result<LibUsbSnapshot> {
        let context = libusb::Context::new().map_err(|e| {
            Error::new(
                ErrorKind::Initialization,
                &format!("libusb: Failed to initialize: {}", e),
            )
        })?;
        let list = context.devices().map_err(|e| {
            Error::new(
                ErrorKind::Initialization,
                &format!("libusb: Failed to get device list: {}", e),
            )
        })?;
        log::debug!("Acquired libusb snapshot of {} devices", list.len());

        Ok(LibUsbSnapshot { list })
    }

    /// Number of devices in the snapshot
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Snapshot contains no devices
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Devices in enumeration order, borrowed from the snapshot
    pub fn iter(&self) -> impl Iterator<Item = libusb::Device<libusb::Context>> + '_ {
        self.list.iter()
    }
}

impl Drop for LibUsbSnapshot {
    fn drop(&mut self) {
        log::debug!("Releasing libusb snapshot of {} devices", self.list.len());
    }
}
