//! Logger configuration
//!
//! Programmatic defaults reproduce the facade's fixed production setup:
//! Info level, console encoding, sampling of 100 then every 100th per call
//! site, stack traces from Error up, stderr only. Configurations loaded from
//! TOML start from the same keys and sinks, but sections left out of the file
//! (sampling, stack traces) are disabled.

use crate::sink::CaptureBuffer;
use logfacade_core_types::{schema, Level};
use logfacade_errors::{LogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default rotation threshold (50 MB)
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 50 * 1024 * 1024;
/// Default number of rotated files kept
pub const DEFAULT_MAX_BACKUPS: usize = 5;
/// Default retention of rotated files, in days
pub const DEFAULT_MAX_AGE_DAYS: u32 = 7;
/// Default sampling thresholds and window
pub const DEFAULT_SAMPLING_FIRST: u64 = 100;
pub const DEFAULT_SAMPLING_THEREAFTER: u64 = 100;
pub const DEFAULT_SAMPLING_TICK_MS: u64 = 1_000;

/// Top-level logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum level a record needs to reach any sink
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub encoding: Encoding,
    /// Records at or above this level carry a captured backtrace
    #[serde(default)]
    pub stacktrace_level: Option<Level>,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub sampling: Option<SamplingConfig>,
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig::Stderr {
        color: ColorMode::Auto,
    }]
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            encoding: Encoding::Console,
            stacktrace_level: Some(Level::Error),
            encoder: EncoderConfig::default(),
            sampling: Some(SamplingConfig::default()),
            sinks: default_sinks(),
        }
    }
}

impl LoggerConfig {
    /// Configuration installed by `set_log_file`: stdout plus a rotating
    /// file, Info level, no sampling and no stack traces.
    pub fn with_log_file(path: impl Into<PathBuf>) -> Self {
        Self {
            level: Level::Info,
            encoding: Encoding::Console,
            stacktrace_level: None,
            encoder: EncoderConfig::default(),
            sampling: None,
            sinks: vec![
                SinkConfig::Stdout {
                    color: ColorMode::Auto,
                },
                SinkConfig::File(FileSinkConfig::new(path)),
            ],
        }
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML and `InvalidConfig` when the
    /// parsed values fail validation.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: LoggerConfig = toml::from_str(s).map_err(|e| LogError::ConfigParse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| LogError::io("read", path, e))?;
        Self::from_toml_str(&raw)
    }

    /// Check invariants the builder relies on
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.sinks.is_empty() {
            return Err(LogError::invalid_config(
                "sinks",
                "at least one sink is required",
            ));
        }
        if let Some(sampling) = &self.sampling {
            if sampling.tick_ms == 0 {
                return Err(LogError::invalid_config(
                    "sampling.tick_ms",
                    "must be greater than zero",
                ));
            }
        }
        if self.encoding == Encoding::Json && self.encoder.message_key.is_empty() {
            return Err(LogError::invalid_config(
                "encoder.message_key",
                "json encoding needs a message key",
            ));
        }
        for sink in &self.sinks {
            if let SinkConfig::File(file) = sink {
                file.validate()?;
            }
        }
        Ok(())
    }
}

/// Record encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Tab-separated, human-readable
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

/// Field names used by the encoders. An empty key omits that element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub time_key: String,
    pub level_key: String,
    pub message_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_key: schema::KEY_TIMESTAMP.to_string(),
            level_key: schema::KEY_LEVEL.to_string(),
            message_key: schema::KEY_MESSAGE.to_string(),
            caller_key: schema::KEY_CALLER.to_string(),
            stacktrace_key: schema::KEY_STACKTRACE.to_string(),
        }
    }
}

/// Per-call-site sampling: within each tick the first `first` records pass,
/// then every `thereafter`-th. A `thereafter` of 0 drops the rest of the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub first: u64,
    pub thereafter: u64,
    pub tick_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            first: DEFAULT_SAMPLING_FIRST,
            thereafter: DEFAULT_SAMPLING_THEREAFTER,
            tick_ms: DEFAULT_SAMPLING_TICK_MS,
        }
    }
}

/// When to wrap messages in ANSI color escapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color only when the destination is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn resolve(&self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Auto => is_terminal,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// A destination for encoded records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    Stdout {
        #[serde(default)]
        color: ColorMode,
    },
    Stderr {
        #[serde(default)]
        color: ColorMode,
    },
    File(FileSinkConfig),
    /// In-memory buffer, for tests and embedding
    #[serde(skip)]
    Capture {
        buffer: CaptureBuffer,
        color: ColorMode,
    },
}

/// Rotating file sink settings. Zero for `max_backups` or `max_age_days`
/// disables that retention rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    pub path: PathBuf,
    pub max_size_bytes: u64,
    pub max_backups: usize,
    pub max_age_days: u32,
    pub compress: bool,
    pub color: ColorMode,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            compress: false,
            color: ColorMode::Auto,
        }
    }
}

impl FileSinkConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LogError::invalid_config("file.path", "must not be empty"));
        }
        if self.max_size_bytes == 0 {
            return Err(LogError::invalid_config(
                "file.max_size_bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
