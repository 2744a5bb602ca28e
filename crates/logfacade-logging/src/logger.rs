//! Logger instances
//!
//! A [`Logger`] owns its sinks and a private `tracing` dispatcher built from
//! a [`LoggerConfig`]:
//!
//! ```text
//! registry
//!   <- one fmt layer per sink (RecordEncoder + sink writer)
//!   <- sampler (optional)
//!   <- level gate
//! ```
//!
//! The facade macros enter that dispatcher as a scoped default, so a logger
//! never touches the application's global subscriber.

use crate::clock::{Clock, SystemClock};
use crate::config::{LoggerConfig, SinkConfig};
use crate::encoder::{level_from_tracing, RecordEncoder};
use crate::sampler::Sampler;
use crate::sink::{RotatingFile, Sink};
use logfacade_core_types::schema::FIELD_FATAL;
use logfacade_core_types::Level;
use logfacade_errors::{LogError, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing::subscriber::Interest;
use tracing::{Dispatch, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::{fmt, Registry};

/// Facade level of a callsite, promoting fatal records
fn callsite_level(metadata: &Metadata<'_>) -> Level {
    if metadata.fields().field(FIELD_FATAL).is_some() {
        Level::Fatal
    } else {
        level_from_tracing(metadata.level())
    }
}

/// Drops records below the configured minimum at callsite registration
#[derive(Debug, Clone, Copy)]
struct LevelGate(Level);

impl LevelGate {
    fn admits(&self, metadata: &Metadata<'_>) -> bool {
        callsite_level(metadata) >= self.0
    }
}

impl<S: Subscriber> Layer<S> for LevelGate {
    fn register_callsite(&self, metadata: &'static Metadata<'static>) -> Interest {
        if self.admits(metadata) {
            Interest::always()
        } else {
            Interest::never()
        }
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.admits(metadata)
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(match self.0 {
            Level::Debug => LevelFilter::DEBUG,
            Level::Info => LevelFilter::INFO,
            Level::Warn => LevelFilter::WARN,
            Level::Error | Level::Fatal => LevelFilter::ERROR,
        })
    }
}

/// A configured logger
#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
    dispatch: Dispatch,
    sinks: Vec<Sink>,
}

impl Logger {
    /// Build a logger using the system clock
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if validation fails and `Io` if a file sink
    /// cannot be opened.
    pub fn build(config: LoggerConfig) -> Result<Self> {
        Self::build_with_clock(config, Arc::new(SystemClock))
    }

    /// Build a logger reading time from `clock`
    ///
    /// # Errors
    ///
    /// As [`Logger::build`].
    pub fn build_with_clock(config: LoggerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let sinks = config
            .sinks
            .iter()
            .map(|sink| open_sink(sink, &clock))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::assemble(config, sinks, clock))
    }

    /// The stderr-only production logger installed at startup
    pub fn console() -> Self {
        let config = LoggerConfig::default();
        Self::assemble(config, vec![Sink::Stderr], Arc::new(SystemClock))
    }

    fn assemble(config: LoggerConfig, sinks: Vec<Sink>, clock: Arc<dyn Clock>) -> Self {
        let encoder = RecordEncoder::new(
            config.encoding,
            config.encoder.clone(),
            config.stacktrace_level,
            clock.clone(),
        );

        let sink_layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = config
            .sinks
            .iter()
            .zip(&sinks)
            .map(|(sink_config, sink)| {
                fmt::layer::<Registry>()
                    .with_writer(sink.clone())
                    .with_ansi(color_enabled(sink_config, sink))
                    .event_format(encoder.clone())
                    .boxed()
            })
            .collect();
        let sampler = config.sampling.map(|sampling| Sampler::new(sampling, clock));

        let subscriber = tracing_subscriber::registry()
            .with(sink_layers)
            .with(sampler)
            .with(LevelGate(config.level));

        Self {
            config,
            dispatch: Dispatch::new(subscriber),
            sinks,
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Whether records at `level` reach the sinks at all
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.config.level
    }

    /// Run `f` with this logger as the current dispatcher
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Flush every sink
    ///
    /// # Errors
    ///
    /// Returns `Io` for the first sink that fails to flush; later sinks are
    /// still flushed.
    pub fn sync(&self) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert_with(|| LogError::io("flush", sink_name(sink), e));
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn open_sink(config: &SinkConfig, clock: &Arc<dyn Clock>) -> Result<Sink> {
    Ok(match config {
        SinkConfig::Stdout { .. } => Sink::Stdout,
        SinkConfig::Stderr { .. } => Sink::Stderr,
        SinkConfig::File(file) => Sink::File(Arc::new(Mutex::new(RotatingFile::open(
            file,
            clock.clone(),
        )?))),
        SinkConfig::Capture { buffer, .. } => Sink::Capture(buffer.clone()),
    })
}

fn color_enabled(config: &SinkConfig, sink: &Sink) -> bool {
    let mode = match config {
        SinkConfig::Stdout { color } | SinkConfig::Stderr { color } => *color,
        SinkConfig::File(file) => file.color,
        SinkConfig::Capture { color, .. } => *color,
    };
    mode.resolve(sink.is_terminal())
}

fn sink_name(sink: &Sink) -> PathBuf {
    match sink {
        Sink::Stdout => PathBuf::from("<stdout>"),
        Sink::Stderr => PathBuf::from("<stderr>"),
        Sink::File(file) => file
            .lock()
            .map(|f| f.path().to_path_buf())
            .unwrap_or_else(|poisoned| poisoned.into_inner().path().to_path_buf()),
        Sink::Capture(_) => PathBuf::from("<capture>"),
    }
}

/// Flush the logger that just took a fatal record, then abort the process
#[doc(hidden)]
pub fn abort_after_fatal(logger: &Logger) -> ! {
    let _ = logger.sync();
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, FileSinkConfig};
    use crate::sink::CaptureBuffer;
    use logfacade_errors::LogErrorKind;

    fn capture_config(buffer: &CaptureBuffer) -> LoggerConfig {
        LoggerConfig {
            sinks: vec![SinkConfig::Capture {
                buffer: buffer.clone(),
                color: ColorMode::Never,
            }],
            ..LoggerConfig::default()
        }
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = LoggerConfig {
            sinks: Vec::new(),
            ..LoggerConfig::default()
        };
        let err = Logger::build(config).unwrap_err();
        assert_eq!(err.kind(), LogErrorKind::InvalidConfig);
    }

    #[test]
    fn test_build_fails_loudly_on_unopenable_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let mut config = LoggerConfig::default();
        config.sinks = vec![SinkConfig::File(FileSinkConfig::new(
            blocker.join("app.log"),
        ))];
        let err = Logger::build(config).unwrap_err();
        assert_eq!(err.kind(), LogErrorKind::Io);
    }

    #[test]
    fn test_enabled_follows_minimum_level() {
        let buffer = CaptureBuffer::new();
        let logger = Logger::build(capture_config(&buffer)).unwrap();
        assert!(!logger.enabled(Level::Debug));
        assert!(logger.enabled(Level::Info));
        assert!(logger.enabled(Level::Fatal));
    }

    #[test]
    fn test_in_scope_routes_events_to_sinks() {
        let buffer = CaptureBuffer::new();
        let logger = Logger::build(capture_config(&buffer)).unwrap();

        logger.in_scope(|| tracing::info!("hello {}", 42));
        logger.in_scope(|| tracing::debug!("hidden"));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\tINFO\t"));
        assert!(lines[0].ends_with("\thello 42"));
        assert!(logger.sync().is_ok());
    }

    #[test]
    fn test_console_logger_targets_stderr() {
        let logger = Logger::console();
        assert_eq!(logger.config(), &LoggerConfig::default());
        assert!(logger.sync().is_ok());
    }
}
