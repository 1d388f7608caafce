//! Text rendering of device reports and device descriptors
use itertools::Itertools;
use std::fmt;
use std::io::{self, Write};

use crate::report::DeviceReport;
use crate::usb::{self, DescriptorType, DeviceDescriptor};

/// Printed in place of the packet size when the host cannot report it
pub const PACKET_SIZE_UNAVAILABLE: &str = "cannot read packet size";

impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "USB class: {} | speed: {} | ",
            self.class_label(),
            self.speed_label()
        )?;

        match self.max_iso_packet_size {
            Some(size) => write!(f, "max iso packet size: {} | ", size)?,
            None => write!(f, "{} | ", PACKET_SIZE_UNAVAILABLE)?,
        }

        write!(
            f,
            "{:04x}:{:04x} (bus {}, device {})",
            self.descriptor.vendor_id, self.descriptor.product_id, self.bus_number, self.address
        )?;

        if let Some((first, rest)) = self.port_numbers.split_first() {
            write!(f, " | port number: {:2}", first)?;
            if !rest.is_empty() {
                write!(f, ".{}", rest.iter().format("."))?;
            }
        }

        Ok(())
    }
}

/// Multi-line dump of every field in a device descriptor
///
/// Renders nothing unless the descriptor kind is [`DescriptorType::Device`].
///
/// ```
/// use usbsnap::display::DescriptorDump;
/// use usbsnap::usb::DeviceDescriptor;
///
/// let mut desc = DeviceDescriptor {
///     descriptor_type: 0x01,
///     usb_version: 0x0200,
///     class_code: 0,
///     sub_class_code: 0,
///     protocol_code: 0,
///     max_packet_size: 8,
///     vendor_id: 0x0403,
///     product_id: 0x6015,
///     device_version: 0x1000,
///     manufacturer_string_index: 1,
///     serial_number_string_index: 3,
///     num_configurations: 1,
/// };
/// assert!(DescriptorDump(&desc).to_string().contains("'vendor-id':0403, 'product-id':6015,"));
///
/// // configuration descriptor
/// desc.descriptor_type = 0x02;
/// assert_eq!(DescriptorDump(&desc).to_string(), "");
/// ```
#[derive(Debug)]
pub struct DescriptorDump<'a>(pub &'a DeviceDescriptor);

impl fmt::Display for DescriptorDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let d = self.0;
        if d.kind() != DescriptorType::Device {
            return Ok(());
        }

        writeln!(
            f,
            "\tUSB{{ 'spec':{:04x}, 'class':{}({}), 'subclass':{},",
            d.usb_version,
            d.class_code,
            usb::class_label(d.class_code),
            d.sub_class_code
        )?;
        writeln!(
            f,
            "\t     'protocol':{}, 'max-packet-size':{},",
            d.protocol_code, d.max_packet_size
        )?;
        writeln!(
            f,
            "\t     'vendor-id':{:04x}, 'product-id':{:04x}, 'release-number(bcd)':{:04x},",
            d.vendor_id, d.product_id, d.device_version
        )?;
        writeln!(
            f,
            "\t     'manufacturer-index':{}, 'serial-number-index':{},",
            d.manufacturer_string_index, d.serial_number_string_index
        )?;
        writeln!(f, "\t     'num-possible-configs':{}, }}", d.num_configurations)
    }
}

/// Write the [`DescriptorDump`] of `descriptor` to `writer`; a no-op for non-device descriptors
pub fn write_descriptor<W: Write>(writer: &mut W, descriptor: &DeviceDescriptor) -> io::Result<()> {
    write!(writer, "{}", DescriptorDump(descriptor))
}
