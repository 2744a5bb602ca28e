//! Process-wide logging facade
//!
//! This crate provides a single active logger with:
//! - Lazy stderr-only default at Info level, sampled per call site
//! - `set_log_file(path)` to duplicate records to stdout and a rotating file
//! - Leveled macros (`debugf!`, `infof!`, `warnf!`, `errorf!`, `fatalf!`)
//! - Per-sink coloring, console or JSON encoding, optional stack traces
//! - A capture sink and manual clock for deterministic tests
//!
//! # Usage
//!
//! ```no_run
//! use logfacade_logging::{errorf, infof, set_log_file};
//!
//! set_log_file("logs/service.log")?;
//! infof!("started {} workers", 8);
//! errorf!("upstream {} unreachable", "db-1");
//! # Ok::<(), logfacade_logging::LogError>(())
//! ```

pub mod clock;
pub mod config;
pub mod encoder;
pub mod global;
pub mod logger;
pub mod macros;
pub mod sampler;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ColorMode, EncoderConfig, Encoding, FileSinkConfig, LoggerConfig, SamplingConfig, SinkConfig,
};
pub use global::{current, init, replace, set_log_file, sync, with_current};
pub use logfacade_core_types::Level;
pub use logfacade_errors::{LogError, LogErrorKind};
pub use logger::Logger;
pub use sink::{CaptureBuffer, RotatingFile};

/// Target attached to every record emitted by the facade macros
pub const TARGET: &str = "logfacade";

#[doc(hidden)]
pub mod __private {
    pub use crate::logger::abort_after_fatal;
    pub use tracing;
}
