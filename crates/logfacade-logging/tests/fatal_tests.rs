//! Fatal records terminate the process
//!
//! Each test re-runs its own test binary with an environment variable set;
//! the child emits the fatal record and the parent inspects how it died.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use logfacade_logging::{
    fatalf, infof, set_log_file, FileSinkConfig, Logger, LoggerConfig, SinkConfig,
};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CHILD_LOG_ENV: &str = "LOGFACADE_FATAL_CHILD_LOG";

fn run_child(test_name: &str, log_path: &Path) -> Output {
    Command::new(std::env::current_exe().unwrap())
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_LOG_ENV, log_path)
        .output()
        .expect("failed to re-run test binary")
}

fn assert_aborted(output: &Output) {
    assert!(
        !output.status.success(),
        "child should not exit cleanly. stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        const SIGABRT: i32 = 6;
        assert_eq!(output.status.signal(), Some(SIGABRT));
    }
}

#[test]
fn test_fatalf_logs_then_aborts() {
    if let Some(path) = std::env::var_os(CHILD_LOG_ENV) {
        set_log_file(&path).unwrap();
        infof!("about to fail");
        fatalf!("unrecoverable: {}", "disk gone");
    }

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("fatal.log");
    let output = run_child("test_fatalf_logs_then_aborts", &log_path);

    assert_aborted(&output);

    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("\tabout to fail\n"));
    assert!(contents.contains("\tFATAL\t"));
    assert!(contents.contains("\tunrecoverable: disk gone\n"));

    // The same record was duplicated to stdout before the abort.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unrecoverable: disk gone"));
}

#[test]
fn test_fatalf_bypasses_level_and_sampling() {
    if let Some(path) = std::env::var_os(CHILD_LOG_ENV) {
        let config = LoggerConfig {
            level: logfacade_logging::Level::Fatal,
            sinks: vec![SinkConfig::File(FileSinkConfig::new(path))],
            stacktrace_level: None,
            ..LoggerConfig::default()
        };
        let logger = Logger::build(config).unwrap();
        for i in 0..150 {
            infof!(logger: &logger, "noise {}", i);
        }
        fatalf!(logger: &logger, "giving up after {} attempts", 3);
    }

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("explicit.log");
    let output = run_child("test_fatalf_bypasses_level_and_sampling", &log_path);

    assert_aborted(&output);

    let contents = fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.contains("\tFATAL\t"));
    assert!(contents.ends_with("\tgiving up after 3 attempts\n"));
}
