//! The process-wide active logger
//!
//! The first facade call lazily installs [`Logger::console`]. Replacing the
//! logger is an atomic pointer swap: a record emitted concurrently with a
//! swap goes to exactly one of the two loggers, never to a half-built one.
//! Swaps are not serialized against each other; configure before spawning
//! logging threads.

use crate::config::LoggerConfig;
use crate::logger::Logger;
use arc_swap::ArcSwap;
use logfacade_errors::Result;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static ACTIVE: OnceLock<ArcSwap<Logger>> = OnceLock::new();

fn active() -> &'static ArcSwap<Logger> {
    ACTIVE.get_or_init(|| ArcSwap::from_pointee(Logger::console()))
}

/// Snapshot of the active logger
pub fn current() -> Arc<Logger> {
    active().load_full()
}

/// Run `f` against the active logger without cloning it
pub fn with_current<T>(f: impl FnOnce(&Logger) -> T) -> T {
    let guard = active().load();
    f(&guard)
}

/// Install `logger` as the active logger, returning the previous one
///
/// The previous logger is flushed before it is handed back.
pub fn replace(logger: Logger) -> Arc<Logger> {
    let previous = active().swap(Arc::new(logger));
    let _ = previous.sync();
    previous
}

/// Build a logger from `config` and make it active
///
/// # Errors
///
/// Returns the build error; the active logger is left untouched.
pub fn init(config: LoggerConfig) -> Result<()> {
    replace(Logger::build(config)?);
    Ok(())
}

/// Duplicate all further records to stdout and a rotating file at `path`
///
/// The file rotates at 50 MB, keeps 5 backups for at most 7 days, and is not
/// compressed. Calling it again replaces the previous file sink.
///
/// # Errors
///
/// Returns `Io` if the file or its directory cannot be created; the active
/// logger is left untouched.
pub fn set_log_file(path: impl AsRef<Path>) -> Result<()> {
    init(LoggerConfig::with_log_file(path.as_ref()))
}

/// Flush the active logger's sinks
///
/// # Errors
///
/// As [`Logger::sync`].
pub fn sync() -> Result<()> {
    with_current(Logger::sync)
}
