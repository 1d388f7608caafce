//! Where the magic happens for `usbsnap` binary!
use clap::Parser;
use std::io::{self, Write};

use usbsnap::config::Config;
use usbsnap::error::{Error, ErrorKind, Result};
use usbsnap::profiler::{SnapshotDump, UsbOperations};
use usbsnap::report::{self, ReportSettings};

/// Print a snapshot of the USB devices on the host, one line per device
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dump the device descriptor after each device line
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Show the speed tier name with its rate
    #[arg(short = 'S', long, default_value_t = false)]
    verbose_speed: bool,

    /// Skip devices whose descriptor cannot be read rather than stopping the report
    #[arg(long, default_value_t = false)]
    skip_unreadable: bool,

    /// Print the snapshot as json, can be read back with --from-json
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Read the snapshot from a json dump rather than the system
    #[arg(long)]
    from_json: Option<String>,

    /// Path to user config file to use, defaults to usbsnap/usbsnap.json in the config directory
    #[arg(short, long)]
    config: Option<String>,

    /// Turn debugging information on. Alternatively can use RUST_LOG env: INFO, DEBUG, TRACE
    #[arg(short = 'z', long, action = clap::ArgAction::Count)]
    debug: u8,
}

/// Flags on the command line enable options on top of the config
fn merge_config(config: &mut Config, args: &Args) {
    config.verbose |= args.verbose;
    config.verbose_speed |= args.verbose_speed;
    config.skip_unreadable |= args.skip_unreadable;
    config.json |= args.json;
}

fn print_snapshot<W, I, D>(
    out: &mut W,
    total: usize,
    devices: I,
    json: bool,
    settings: &ReportSettings,
) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = D>,
    D: UsbOperations,
{
    if json {
        let mut dump = SnapshotDump::capture(devices);
        // replaying a capped dump keeps the host total
        if total > dump.len() {
            dump.total_devices = Some(total);
        }
        serde_json::to_writer_pretty(&mut *out, &dump)?;
        writeln!(out)?;
    } else {
        report::write_report(out, total, devices, settings)?;
    }

    out.flush()?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut config = match args.config.as_ref() {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default()?,
    };
    merge_config(&mut config, &args);
    log::debug!("Running with {:?}", config);

    let settings = config.report_settings();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(path) = args.from_json.as_ref() {
        let dump = SnapshotDump::from_file(path)?;
        return print_snapshot(&mut out, dump.total(), dump.iter(), config.json, &settings);
    }

    print_system(&mut out, config.json, &settings)
}

/// Enumerate with libusb; the snapshot is released when this returns
#[cfg(feature = "libusb")]
fn print_system<W: Write>(out: &mut W, json: bool, settings: &ReportSettings) -> Result<()> {
    let snapshot = usbsnap::profiler::libusb::LibUsbSnapshot::acquire()?;
    print_snapshot(out, snapshot.len(), snapshot.iter(), json, settings)
}

#[cfg(not(feature = "libusb"))]
fn print_system<W: Write>(_out: &mut W, _json: bool, _settings: &ReportSettings) -> Result<()> {
    Err(Error::new(
        ErrorKind::Unsupported,
        "usbsnap was built without the 'libusb' feature, only --from-json is available",
    ))
}

/// Closed pipe on `usbsnap | head` is not a failure
fn is_broken_pipe(error: &Error) -> bool {
    error.kind() == ErrorKind::Io(io::ErrorKind::BrokenPipe)
}

fn exit_code(error: &Error) -> i32 {
    match error.kind() {
        ErrorKind::Initialization => -1,
        _ => 1,
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = usbsnap::set_log_level(args.debug) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(args) {
        if is_broken_pipe(&e) {
            return;
        }
        eprintln!("{:#}", e);
        std::process::exit(exit_code(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_config_or() {
        let mut config = Config {
            skip_unreadable: true,
            ..Default::default()
        };
        let args = Args {
            verbose: true,
            ..Default::default()
        };
        merge_config(&mut config, &args);
        assert!(config.verbose);
        assert!(config.skip_unreadable);
        assert!(!config.json);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&Error::new(ErrorKind::Initialization, "")), -1);
        assert_eq!(exit_code(&Error::new(ErrorKind::DescriptorRead, "")), 1);
        assert_eq!(exit_code(&Error::new(ErrorKind::Unsupported, "")), 1);
    }

    #[test]
    fn test_json_of_capped_replay_keeps_total() {
        let devices = vec![usbsnap::profiler::DeviceRecord::default(); report::MAX_DEVICES];
        let mut out = Vec::new();
        print_snapshot(&mut out, 300, devices.iter(), true, &ReportSettings::default()).unwrap();

        let dump = SnapshotDump::from_json(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(dump.len(), report::MAX_DEVICES);
        assert_eq!(dump.total(), 300);
    }

    #[test]
    fn test_broken_pipe_from_io_kind() {
        let pipe = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
        assert!(is_broken_pipe(&pipe));

        let other = Error::from(io::Error::new(io::ErrorKind::Other, "Broken pipe"));
        assert!(!is_broken_pipe(&other));
        assert!(!is_broken_pipe(&Error::new(ErrorKind::Config, "Broken pipe")));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["usbsnap", "-v", "-S", "-zz", "--from-json", "dump.json"]);
        assert!(args.verbose);
        assert!(args.verbose_speed);
        assert_eq!(args.debug, 2);
        assert_eq!(args.from_json.as_deref(), Some("dump.json"));
    }
}
