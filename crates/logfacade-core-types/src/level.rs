//! Severity levels understood by the facade

use crate::schema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Facade severity, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// All levels in ascending severity
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Capitalized label used by both encodings
    pub fn label(&self) -> &'static str {
        match self {
            Level::Debug => schema::LABEL_DEBUG,
            Level::Info => schema::LABEL_INFO,
            Level::Warn => schema::LABEL_WARN,
            Level::Error => schema::LABEL_ERROR,
            Level::Fatal => schema::LABEL_FATAL,
        }
    }

    /// ANSI escape opening a colored message at this level
    ///
    /// Fatal messages are written plain.
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Level::Debug => Some(schema::ANSI_BLUE),
            Level::Info => Some(schema::ANSI_GREEN),
            Level::Warn => Some(schema::ANSI_MAGENTA),
            Level::Error => Some(schema::ANSI_RED),
            Level::Fatal => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown level name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown level '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_labels_are_capitalized() {
        for level in Level::ALL {
            assert_eq!(level.label(), level.label().to_ascii_uppercase());
        }
        assert_eq!(Level::Warn.to_string(), "WARN");
    }

    #[test]
    fn test_colors_per_level() {
        assert_eq!(Level::Debug.color(), Some("\x1b[0;34m"));
        assert_eq!(Level::Info.color(), Some("\x1b[0;32m"));
        assert_eq!(Level::Warn.color(), Some("\x1b[0;35m"));
        assert_eq!(Level::Error.color(), Some("\x1b[0;31m"));
        assert_eq!(Level::Fatal.color(), None);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("INFO".parse::<Level>(), Ok(Level::Info));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Level::Error).unwrap();
        assert_eq!(json, "\"error\"");
        let level: Level = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, Level::Debug);
    }
}
