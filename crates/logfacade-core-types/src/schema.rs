//! Canonical schema constants for encoded log records
//!
//! These constants keep the console and JSON encodings consistent with each
//! other and with the defaults of the configuration layer.

// Canonical encoder keys
pub const KEY_TIMESTAMP: &str = "ts";
pub const KEY_LEVEL: &str = "lvl";
pub const KEY_MESSAGE: &str = "msg";
pub const KEY_CALLER: &str = "caller";
pub const KEY_STACKTRACE: &str = "stacktrace";

// Level labels (capitalized level encoding)
pub const LABEL_DEBUG: &str = "DEBUG";
pub const LABEL_INFO: &str = "INFO";
pub const LABEL_WARN: &str = "WARN";
pub const LABEL_ERROR: &str = "ERROR";
pub const LABEL_FATAL: &str = "FATAL";

// ANSI escapes wrapped around the message on color-capable sinks
pub const ANSI_BLUE: &str = "\x1b[0;34m";
pub const ANSI_GREEN: &str = "\x1b[0;32m";
pub const ANSI_MAGENTA: &str = "\x1b[0;35m";
pub const ANSI_RED: &str = "\x1b[0;31m";
pub const ANSI_RESET: &str = "\x1b[0m";

/// Timestamp layout for the ISO8601 encoding (local time, millisecond precision)
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// ISO8601 layout used when the local offset is zero
pub const ISO8601_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Field set on fatal records so encoders render them as FATAL
pub const FIELD_FATAL: &str = "fatal";
