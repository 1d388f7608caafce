//! Error type used within crate with From for commonly used crate errors
use std::error;
use std::{fmt, io};

/// Result type used within crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq, Eq, Clone)]
/// Kind of error produced
pub enum ErrorKind {
    /// USB host interface could not be started or could not list devices
    Initialization,
    /// Unable to retrieve a device descriptor
    DescriptorRead,
    /// Isochronous max packet size could not be read for the endpoint
    PacketSizeUnavailable,
    /// Port path could not be resolved
    PortPath,
    /// Unsupported for this build; libusb feature not enabled for example
    Unsupported,
    /// Error parsing a string or json into a value
    Parsing,
    /// Error parsing config file
    Config,
    /// [`std::io::Error`] probably not found when reading file to parse, or writing the report
    Io(io::ErrorKind),
    /// libusb error
    LibUSB,
    /// Error From other crate without enum variant
    Other(&'static str),
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// usbsnap error which impl [`std::error`]
pub struct Error {
    /// The [`ErrorKind`]
    pub kind: ErrorKind,
    /// String description
    pub message: String,
}

impl Error {
    /// New error helper
    pub fn new(kind: ErrorKind, message: &str) -> Error {
        Error {
            kind,
            message: message.to_string(),
        }
    }

    /// The [`ErrorKind`]
    pub fn kind(&self) -> ErrorKind {
        self.kind.to_owned()
    }

    /// The description
    pub fn message(&self) -> &String {
        &self.message
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{:?} Error: {}", self.kind, self.message)
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error {
            kind: ErrorKind::Io(error.kind()),
            message: error.to_string(),
        }
    }
}

/// Writer failures keep their [`io::ErrorKind`]; everything else is [`ErrorKind::Parsing`]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        if error.is_io() {
            return Error::from(io::Error::from(error));
        }

        Error {
            kind: ErrorKind::Parsing,
            message: error.to_string(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(val: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, val.message)
    }
}
