//! Defines for USB, mainly those covered at [usb.org](https://www.usb.org)
//!
//! Holds the total lookups from raw descriptor codes to the short labels used in the report.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Label used for any class code without a short name
pub const UNKNOWN_CLASS_LABEL: &str = "  ?";
/// Label used for any speed code libusb does not define
pub const UNKNOWN_SPEED_LABEL: &str = "?";

/// USB class code defines [ref](https://www.usb.org/defined-class-codes)
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ClassCode {
    #[default]
    UseInterfaceDescriptor,
    Audio,
    CDCCommunications,
    HID,
    Physical,
    Image,
    Printer,
    MassStorage,
    Hub,
    CDCData,
    SmartCart,
    ContentSecurity,
    Video,
    PersonalHealthcare,
    AudioVideo,
    Billboard,
    USBTypeCBridge,
    I3CDevice,
    Diagnostic,
    WirelessController,
    Miscellaneous,
    ApplicationSpecific,
    VendorSpecific,
}

impl From<u8> for ClassCode {
    fn from(b: u8) -> ClassCode {
        match b {
            0 => ClassCode::UseInterfaceDescriptor,
            1 => ClassCode::Audio,
            2 => ClassCode::CDCCommunications,
            3 => ClassCode::HID,
            5 => ClassCode::Physical,
            6 => ClassCode::Image,
            7 => ClassCode::Printer,
            8 => ClassCode::MassStorage,
            9 => ClassCode::Hub,
            0x0a => ClassCode::CDCData,
            0x0b => ClassCode::SmartCart,
            0x0d => ClassCode::ContentSecurity,
            0x0e => ClassCode::Video,
            0x0f => ClassCode::PersonalHealthcare,
            0x10 => ClassCode::AudioVideo,
            0x11 => ClassCode::Billboard,
            0x12 => ClassCode::USBTypeCBridge,
            0x3c => ClassCode::I3CDevice,
            0xdc => ClassCode::Diagnostic,
            0xe0 => ClassCode::WirelessController,
            0xef => ClassCode::Miscellaneous,
            0xfe => ClassCode::ApplicationSpecific,
            0xff => ClassCode::VendorSpecific,
            _ => ClassCode::UseInterfaceDescriptor,
        }
    }
}

impl ClassCode {
    /// Short human label used in the device report
    ///
    /// Only the early USB 1.x device classes have a short name; everything else is [`UNKNOWN_CLASS_LABEL`]
    pub fn label(&self) -> &'static str {
        match self {
            ClassCode::Audio => "audio",
            ClassCode::CDCCommunications => "communication",
            ClassCode::HID => "human-interface",
            ClassCode::Physical => "physical",
            ClassCode::Image => "image",
            ClassCode::Printer => "printer",
            ClassCode::MassStorage => "mass-storage",
            ClassCode::Hub => "hub",
            ClassCode::CDCData => "data",
            ClassCode::SmartCart => "smart-card",
            ClassCode::Video => "video",
            _ => UNKNOWN_CLASS_LABEL,
        }
    }
}

/// Label for a raw `bDeviceClass`; total over every `u8`
///
/// ```
/// use usbsnap::usb::class_label;
///
/// assert_eq!(class_label(0x03), "human-interface");
/// assert_eq!(class_label(0x08), "mass-storage");
/// assert_eq!(class_label(0xff), "  ?");
/// ```
pub fn class_label(class_code: u8) -> &'static str {
    ClassCode::from(class_code).label()
}

/// Presentation of a [`Speed`] label
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SpeedMode {
    /// Tier name and rate, `high(   480Mbps)`
    Verbose,
    /// Right justified rate only, `  480Mbps`
    #[default]
    Compact,
}

/// USB Speed is also defined in libusb but this one allows us to provide updates and custom impl
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Speed {
    #[default]
    Unknown,
    LowSpeed,
    FullSpeed,
    HighSpeed,
    SuperSpeed,
    SuperSpeedPlus,
    /// Code outside those defined by libusb
    Unrecognised,
}

/// Convert from libusb `enum libusb_speed` value
impl From<u8> for Speed {
    fn from(b: u8) -> Self {
        match b {
            5 => Speed::SuperSpeedPlus,
            4 => Speed::SuperSpeed,
            3 => Speed::HighSpeed,
            2 => Speed::FullSpeed,
            1 => Speed::LowSpeed,
            0 => Speed::Unknown,
            _ => Speed::Unrecognised,
        }
    }
}

impl Speed {
    /// Fixed width bandwidth label for the report
    ///
    /// ```
    /// use usbsnap::usb::{Speed, SpeedMode};
    ///
    /// assert_eq!(Speed::HighSpeed.label(SpeedMode::Compact), "  480Mbps");
    /// assert_eq!(Speed::HighSpeed.label(SpeedMode::Verbose), "high(   480Mbps)");
    /// assert_eq!(Speed::Unrecognised.label(SpeedMode::Compact), "?");
    /// ```
    pub fn label(&self, mode: SpeedMode) -> &'static str {
        match mode {
            SpeedMode::Verbose => match self {
                Speed::Unknown => "unknown",
                Speed::LowSpeed => "low(    1.5Mbps)",
                Speed::FullSpeed => "full(    12Mbps)",
                Speed::HighSpeed => "high(   480Mbps)",
                Speed::SuperSpeed => "super( 5000Mbps)",
                Speed::SuperSpeedPlus => "super plus(10000Mbps)",
                Speed::Unrecognised => UNKNOWN_SPEED_LABEL,
            },
            SpeedMode::Compact => match self {
                Speed::Unknown => "  unknown",
                Speed::LowSpeed => "  1.5Mbps",
                Speed::FullSpeed => "   12Mbps",
                Speed::HighSpeed => "  480Mbps",
                Speed::SuperSpeed => " 5000Mbps",
                Speed::SuperSpeedPlus => "10000Mbps",
                Speed::Unrecognised => UNKNOWN_SPEED_LABEL,
            },
        }
    }
}

/// Label for a raw libusb speed code; total over every `u8`
pub fn speed_label(speed_code: u8, mode: SpeedMode) -> &'static str {
    Speed::from(speed_code).label(mode)
}

/// Standard descriptor types, the `bDescriptorType` kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DescriptorType {
    Device,
    Config,
    String,
    Interface,
    Endpoint,
    Other(u8),
}

impl From<u8> for DescriptorType {
    fn from(b: u8) -> Self {
        match b {
            0x01 => DescriptorType::Device,
            0x02 => DescriptorType::Config,
            0x03 => DescriptorType::String,
            0x04 => DescriptorType::Interface,
            0x05 => DescriptorType::Endpoint,
            v => DescriptorType::Other(v),
        }
    }
}

impl From<DescriptorType> for u8 {
    fn from(dt: DescriptorType) -> Self {
        match dt {
            DescriptorType::Device => 0x01,
            DescriptorType::Config => 0x02,
            DescriptorType::String => 0x03,
            DescriptorType::Interface => 0x04,
            DescriptorType::Endpoint => 0x05,
            DescriptorType::Other(v) => v,
        }
    }
}

/// Standard device descriptor as returned by the host for one device
///
/// BCD fields are kept in their raw wire encoding, `0x0200` for USB 2.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct DeviceDescriptor {
    /// `bDescriptorType`; the formatter only prints [`DescriptorType::Device`]
    pub descriptor_type: u8,
    /// `bcdUSB`
    pub usb_version: u16,
    pub class_code: u8,
    pub sub_class_code: u8,
    pub protocol_code: u8,
    /// `bMaxPacketSize0`
    pub max_packet_size: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    /// `bcdDevice`
    pub device_version: u16,
    pub manufacturer_string_index: u8,
    pub serial_number_string_index: u8,
    pub num_configurations: u8,
}

impl DeviceDescriptor {
    /// The `bDescriptorType` kind tag
    pub fn kind(&self) -> DescriptorType {
        DescriptorType::from(self.descriptor_type)
    }
}

/// Builds a replica of sysfs path for identifying a device in messages
///
/// ```
/// use usbsnap::usb::get_port_path;
///
/// assert_eq!(get_port_path(1, &[1, 3, 2]), String::from("1-1.3.2"));
/// assert_eq!(get_port_path(1, &[2]), String::from("1-2"));
/// // special case for root_hub
/// assert_eq!(get_port_path(2, &[]), String::from("2-0"));
/// ```
pub fn get_port_path(bus: u8, ports: &[u8]) -> String {
    if ports.is_empty() {
        format!("{}-0", bus)
    } else {
        format!("{}-{}", bus, ports.iter().format("."))
    }
}
