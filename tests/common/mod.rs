//! Runs tests using actual binary, apapted from 'fd' method: https://github.com/sharkdp/fd/blob/master/tests/testenv/mod.rs
#![allow(dead_code)]
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process;

// if changing DeviceRecord, regenerate dumps with `usbsnap --from-json DUMP --json > file.json`
/// Snapshot of four readable devices: root hub, HID, FTDI and mass storage
pub const SNAPSHOT_DUMP: &str = "./tests/data/snapshot.json";
/// Snapshot of three devices where the second has no device descriptor
pub const SNAPSHOT_UNREADABLE_DUMP: &str = "./tests/data/snapshot_unreadable.json";
/// Snapshot with no devices
pub const SNAPSHOT_EMPTY_DUMP: &str = "./tests/data/snapshot_empty.json";
/// Output of `usbsnap` for [`SNAPSHOT_DUMP`]
pub const REPORT_OUTPUT: &str = "./tests/data/report.txt";
/// Output of `usbsnap --verbose --verbose-speed` for [`SNAPSHOT_DUMP`]
pub const REPORT_OUTPUT_VERBOSE: &str = "./tests/data/report_verbose.txt";

pub fn read_dump(file_name: &str) -> BufReader<File> {
    let f = File::open(file_name).expect("Unable to open json dump file");
    BufReader::new(f)
}

pub fn read_dump_to_string(file_name: &str) -> String {
    let mut ret = String::new();
    let mut br = read_dump(file_name);
    br.read_to_string(&mut ret)
        .unwrap_or_else(|_| panic!("Failed to read {}", file_name));
    ret
}

pub fn snapshot_from_dump(file_name: &str) -> usbsnap::profiler::SnapshotDump {
    usbsnap::profiler::SnapshotDump::from_json(&read_dump_to_string(file_name))
        .expect("Unable to parse snapshot dump")
}

/// Environment for the integration tests.
pub struct TestEnv {
    /// Path to the *usbsnap* executable.
    usbsnap_exe: PathBuf,
    /// Config file passed with --config so a user config does not change output
    config: PathBuf,
}

/// Find the *usbsnap* executable.
fn find_usbsnap_exe() -> PathBuf {
    // Tests exe is in target/debug/deps, the *usbsnap* exe is in target/debug
    let root = env::current_exe()
        .expect("tests executable")
        .parent()
        .expect("tests executable directory")
        .parent()
        .expect("usbsnap executable directory")
        .to_path_buf();

    let exe_name = if cfg!(windows) {
        "usbsnap.exe"
    } else {
        "usbsnap"
    };

    root.join(exe_name)
}

/// Format an error message for when *usbsnap* did not exit successfully.
fn format_exit_error(args: &[&str], output: &process::Output) -> String {
    format!(
        "`usbsnap {}` did not exit successfully.\nstdout:\n---\n{}---\nstderr:\n---\n{}---",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Format an error message for when the output of *usbsnap* did not match the expected output.
fn format_output_error(args: &[&str], expected: &str, actual: &str) -> String {
    // Generate diff text.
    let diff_text = diff::lines(expected, actual)
        .into_iter()
        .map(|diff| match diff {
            diff::Result::Left(l) => format!("-{}", l),
            diff::Result::Both(l, _) => format!(" {}", l),
            diff::Result::Right(r) => format!("+{}", r),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        concat!(
            "`usbsnap {}` did not produce the expected output.\n",
            "Showing diff between expected and actual:\n{}\n"
        ),
        args.join(" "),
        diff_text
    )
}

/// Normalize line endings and trailing whitespace; line order is significant
fn normalize_output(s: &str) -> String {
    s.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

impl TestEnv {
    pub fn new() -> TestEnv {
        TestEnv {
            usbsnap_exe: find_usbsnap_exe(),
            config: PathBuf::from("./tests/data/config_default.json"),
        }
    }

    /// Get the path of the usbsnap executable.
    #[cfg_attr(windows, allow(unused))]
    pub fn test_exe(&self) -> &PathBuf {
        &self.usbsnap_exe
    }

    fn command(&self, dump_file: &str, args: &[&str]) -> process::Command {
        let mut cmd = process::Command::new(&self.usbsnap_exe);
        cmd.arg("--config")
            .arg(&self.config)
            .arg("--from-json")
            .arg(dump_file)
            .args(args);
        cmd
    }

    /// Assert that calling *usbsnap* with the dump and arguments succeeds and return the output
    pub fn assert_success_and_get_output(&self, dump_file: &str, args: &[&str]) -> process::Output {
        let output = self.command(dump_file, args).output().expect("usbsnap output");

        // Check for exit status.
        if !output.status.success() {
            panic!("{}", format_exit_error(args, &output));
        }

        output
    }

    /// Assert that calling *usbsnap* with the specified arguments produces the expected output.
    pub fn assert_output(&self, dump_file: &str, args: &[&str], expected: &str, contains: bool) {
        let output = self.assert_success_and_get_output(dump_file, args);
        let actual = String::from_utf8_lossy(&output.stdout).to_string();

        if contains {
            if !actual.contains(expected) {
                panic!("{}", format_output_error(args, expected, &actual));
            }
        } else {
            let (expected, actual) = (normalize_output(expected), normalize_output(&actual));
            if expected != actual {
                panic!("{}", format_output_error(args, &expected, &actual));
            }
        }
    }

    /// Assert json output is equal to the `expected` json
    pub fn assert_output_json(&self, dump_file: &str, args: &[&str], expected: &str) {
        let output = self.assert_success_and_get_output(dump_file, args);
        let actual: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("usbsnap output is not json");
        let expected: serde_json::Value =
            serde_json::from_str(expected).expect("expected is not json");

        assert_json_diff::assert_json_eq!(actual, expected);
    }

    /// Assert that calling *usbsnap* fails, with stderr starting with `expected_error` and stdout equal to `expected_stdout`
    pub fn assert_failure_with_error(
        &self,
        dump_file: &str,
        args: &[&str],
        expected_stdout: &str,
        expected_error: &str,
    ) -> process::ExitStatus {
        let output = self.command(dump_file, args).output().expect("usbsnap output");

        if output.status.success() {
            panic!("error '{}' did not occur.", expected_error);
        }

        let actual_err = String::from_utf8_lossy(&output.stderr);
        if !actual_err.trim_start().starts_with(expected_error) {
            panic!("{}", format_output_error(args, expected_error, &actual_err));
        }

        let actual = normalize_output(&String::from_utf8_lossy(&output.stdout));
        let expected = normalize_output(expected_stdout);
        if actual != expected {
            panic!("{}", format_output_error(args, &expected, &actual));
        }

        output.status
    }
}
