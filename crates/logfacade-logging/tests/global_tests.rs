//! Process-wide logger lifecycle
//!
//! Runs as a single test so no other test in this binary races on the
//! active logger.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use logfacade_logging::{
    current, debugf, errorf, infof, init, replace, set_log_file, sync, warnf, CaptureBuffer,
    ColorMode, LogErrorKind, Logger, LoggerConfig, SinkConfig,
};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn capture_config(buffer: &CaptureBuffer) -> LoggerConfig {
    LoggerConfig {
        sampling: None,
        stacktrace_level: None,
        sinks: vec![SinkConfig::Capture {
            buffer: buffer.clone(),
            color: ColorMode::Never,
        }],
        ..LoggerConfig::default()
    }
}

#[test]
fn test_active_logger_lifecycle() {
    // Lazily installed default: stderr only.
    assert_eq!(current().config(), &LoggerConfig::default());
    infof!("default logger is live");

    // Explicit replacement routes the macros.
    let first = CaptureBuffer::new();
    init(capture_config(&first)).unwrap();
    debugf!("dropped");
    infof!("to first {}", 1);
    warnf!("to first {}", 2);
    assert_eq!(first.lines().len(), 2);

    // A failed build leaves the active logger in place.
    let bad = LoggerConfig {
        sinks: Vec::new(),
        ..LoggerConfig::default()
    };
    assert_eq!(init(bad).unwrap_err().kind(), LogErrorKind::InvalidConfig);
    errorf!("still first");
    assert_eq!(first.lines().len(), 3);

    // set_log_file swaps in stdout + rotating file.
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs").join("service.log");
    set_log_file(&path).unwrap();
    infof!("to the file {}", "now");
    sync().unwrap();
    assert_eq!(first.lines().len(), 3);
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("\tINFO\t"));
    assert!(contents.contains("\tto the file now\n"));
    assert!(current().config().sampling.is_none());

    // Calling it again fully replaces the previous file sink.
    let second_path = dir.path().join("second.log");
    set_log_file(&second_path).unwrap();
    infof!("second file");
    sync().unwrap();
    assert!(!fs::read_to_string(&path).unwrap().contains("second file"));
    assert!(fs::read_to_string(&second_path)
        .unwrap()
        .contains("\tsecond file\n"));

    // A file that cannot be created is reported, not deferred.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let err = set_log_file(blocker.join("nested.log")).unwrap_err();
    assert_eq!(err.kind(), LogErrorKind::Io);

    // Concurrent callers during a swap land on exactly one logger each.
    let old_buffer = CaptureBuffer::new();
    let new_buffer = CaptureBuffer::new();
    replace(Logger::build(capture_config(&old_buffer)).unwrap());

    let stop = Arc::new(AtomicBool::new(false));
    let sent = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let stop = Arc::clone(&stop);
            let sent = Arc::clone(&sent);
            thread::spawn(move || {
                let mut i = 0;
                while !stop.load(Ordering::Relaxed) || i < 50 {
                    infof!("worker {} record {}", worker, i);
                    sent.fetch_add(1, Ordering::Relaxed);
                    i += 1;
                }
            })
        })
        .collect();

    thread::sleep(std::time::Duration::from_millis(5));
    let previous = replace(Logger::build(capture_config(&new_buffer)).unwrap());
    thread::sleep(std::time::Duration::from_millis(5));
    stop.store(true, Ordering::Relaxed);
    for handle in handles {
        handle.join().unwrap();
    }
    drop(previous);

    let total = old_buffer.lines().len() + new_buffer.lines().len();
    assert_eq!(total, sent.load(Ordering::Relaxed));
    assert!(!new_buffer.is_empty());
}
