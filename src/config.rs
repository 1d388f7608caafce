//! Config for usbsnap binary
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use crate::error::{Error, ErrorKind, Result};
use crate::report::{DescriptorFailurePolicy, ReportSettings};
use crate::usb::SpeedMode;

const CONF_DIR: &str = "usbsnap";
const CONF_NAME: &str = "usbsnap.json";

/// Persistent defaults for the binary; every field can also be enabled from the command line
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dump the device descriptor after each device line
    pub verbose: bool,
    /// Tier name with rate for speeds, `high(   480Mbps)`
    pub verbose_speed: bool,
    /// Skip devices with unreadable descriptors rather than stopping the report
    pub skip_unreadable: bool,
    /// Print the snapshot as json rather than the report
    pub json: bool,
}

impl Config {
    /// Default new
    pub fn new() -> Config {
        Config {
            ..Default::default()
        }
    }

    /// Default config file location, `$XDG_CONFIG_HOME/usbsnap/usbsnap.json` on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONF_DIR).join(CONF_NAME))
    }

    /// Attempt to read from .json format config at `file_path`
    pub fn from_file(file_path: &str) -> Result<Config> {
        let f = File::open(file_path).map_err(|e| {
            Error::new(
                ErrorKind::Config,
                &format!("Failed to open config {}: {}", file_path, e),
            )
        })?;
        let mut br = BufReader::new(f);
        let mut data = String::new();

        br.read_to_string(&mut data)?;
        serde_json::from_str::<Config>(&data).map_err(|e| {
            Error::new(
                ErrorKind::Config,
                &format!("Failed to parse config {}: {}", file_path, e),
            )
        })
    }

    /// Load the config at [`Config::default_path`] if it exists, otherwise [`Config::new`]
    pub fn load_default() -> Result<Config> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(&path.to_string_lossy())
            }
            _ => {
                log::debug!("No config file, using defaults");
                Ok(Config::new())
            }
        }
    }

    /// [`ReportSettings`] this config asks for
    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            speed_mode: if self.verbose_speed {
                SpeedMode::Verbose
            } else {
                SpeedMode::Compact
            },
            dump_descriptors: self.verbose,
            descriptor_failure: if self.skip_unreadable {
                DescriptorFailurePolicy::Skip
            } else {
                DescriptorFailurePolicy::Abort
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config() {
        let config: Config =
            serde_json::from_str(r#"{ "verbose-speed": true, "skip-unreadable": true }"#).unwrap();
        assert_eq!(
            config,
            Config {
                verbose_speed: true,
                skip_unreadable: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_deny_unknown_fields() {
        assert!(serde_json::from_str::<Config>(r#"{ "colours": {} }"#).is_err());
    }

    #[test]
    fn test_report_settings() {
        let settings = Config::new().report_settings();
        assert_eq!(settings.speed_mode, SpeedMode::Compact);
        assert!(!settings.dump_descriptors);
        assert_eq!(settings.descriptor_failure, DescriptorFailurePolicy::Abort);

        let settings = Config {
            verbose: true,
            verbose_speed: true,
            skip_unreadable: true,
            json: false,
        }
        .report_settings();
        assert_eq!(settings.speed_mode, SpeedMode::Verbose);
        assert!(settings.dump_descriptors);
        assert_eq!(settings.descriptor_failure, DescriptorFailurePolicy::Skip);
    }

    #[test]
    fn test_from_file_missing_is_config_error() {
        let err = Config::from_file("./no/such/usbsnap.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
