//! Record encoders
//!
//! [`RecordEncoder`] plugs into `tracing_subscriber::fmt` as the event
//! formatter for every sink. Console encoding produces
//! `ts \t LEVEL \t dir/file.rs:line \t message`; JSON encoding emits one object
//! per line. Color is decided by the sink, never by the message template.

use crate::clock::Clock;
use crate::config::{EncoderConfig, Encoding};
use chrono::{DateTime, Local, Offset, TimeZone};
use logfacade_core_types::schema::{ANSI_RESET, FIELD_FATAL, ISO8601_FORMAT, ISO8601_UTC_FORMAT};
use logfacade_core_types::Level;
use std::backtrace::Backtrace;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// A record ready for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub timestamp: String,
    pub caller: Option<String>,
    pub message: String,
    pub stacktrace: Option<String>,
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fatal: bool,
}

impl Visit for RecordVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == FIELD_FATAL {
            self.fatal = value;
        }
    }
}

/// Map a tracing level onto the facade's levels
pub fn level_from_tracing(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::ERROR => Level::Error,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::INFO => Level::Info,
        _ => Level::Debug,
    }
}

/// Trim a source path to its last directory and file name
pub fn short_caller(file: &str, line: u32) -> String {
    let mut parts = file.rsplit(['/', '\\']);
    let name = parts.next().unwrap_or(file);
    match parts.next().filter(|dir| !dir.is_empty()) {
        Some(dir) => format!("{}/{}:{}", dir, name, line),
        None => format!("{}:{}", name, line),
    }
}

/// Render a timestamp as ISO8601 with millisecond precision
///
/// A zero offset is written as `Z`, any other as `+hhmm` / `-hhmm`.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let layout = if at.offset().fix().local_minus_utc() == 0 {
        ISO8601_UTC_FORMAT
    } else {
        ISO8601_FORMAT
    };
    at.format(layout).to_string()
}

/// Event formatter shared by every sink layer of a logger
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    encoding: Encoding,
    keys: EncoderConfig,
    stacktrace_level: Option<Level>,
    clock: Arc<dyn Clock>,
}

impl RecordEncoder {
    pub fn new(
        encoding: Encoding,
        keys: EncoderConfig,
        stacktrace_level: Option<Level>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding,
            keys,
            stacktrace_level,
            clock,
        }
    }

    /// Encode a record into one line (plus an optional stack trace)
    pub fn encode(&self, record: &Record, color: bool) -> String {
        match self.encoding {
            Encoding::Console => self.encode_console(record, color),
            Encoding::Json => self.encode_json(record),
        }
    }

    fn encode_console(&self, record: &Record, color: bool) -> String {
        let mut elements: Vec<&str> = Vec::with_capacity(4);
        if !self.keys.time_key.is_empty() {
            elements.push(record.timestamp.as_str());
        }
        if !self.keys.level_key.is_empty() {
            elements.push(record.level.label());
        }
        if let Some(caller) = record.caller.as_deref() {
            if !self.keys.caller_key.is_empty() {
                elements.push(caller);
            }
        }

        let mut line = elements.join("\t");
        if !self.keys.message_key.is_empty() {
            if !line.is_empty() {
                line.push('\t');
            }
            match record.level.color().filter(|_| color) {
                Some(escape) => {
                    line.push_str(escape);
                    line.push_str(&record.message);
                    line.push_str(ANSI_RESET);
                }
                None => line.push_str(&record.message),
            }
        }
        if let Some(trace) = record.stacktrace.as_deref() {
            if !self.keys.stacktrace_key.is_empty() {
                line.push('\n');
                line.push_str(trace.trim_end());
            }
        }
        line.push('\n');
        line
    }

    fn encode_json(&self, record: &Record) -> String {
        let mut fields: Vec<(&str, &str)> = Vec::with_capacity(5);
        fields.push((self.keys.level_key.as_str(), record.level.label()));
        fields.push((self.keys.time_key.as_str(), record.timestamp.as_str()));
        if let Some(caller) = record.caller.as_deref() {
            fields.push((self.keys.caller_key.as_str(), caller));
        }
        fields.push((self.keys.message_key.as_str(), record.message.as_str()));
        if let Some(trace) = record.stacktrace.as_deref() {
            fields.push((self.keys.stacktrace_key.as_str(), trace));
        }

        let mut line = String::from("{");
        for (key, value) in fields.into_iter().filter(|(key, _)| !key.is_empty()) {
            if line.len() > 1 {
                line.push(',');
            }
            let _ = write!(line, "{}:{}", json_string(key), json_string(value));
        }
        line.push_str("}\n");
        line
    }

    fn record_for(&self, event: &Event<'_>) -> Record {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let level = if visitor.fatal {
            Level::Fatal
        } else {
            level_from_tracing(metadata.level())
        };
        let caller = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => Some(short_caller(file, line)),
            _ => None,
        };
        let stacktrace = self
            .stacktrace_level
            .filter(|min| level >= *min)
            .map(|_| Backtrace::force_capture().to_string());

        Record {
            level,
            timestamp: format_timestamp(&self.clock.now().with_timezone(&Local)),
            caller,
            message: visitor.message,
            stacktrace,
        }
    }
}

fn json_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

impl<S, N> FormatEvent<S, N> for RecordEncoder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let record = self.record_for(event);
        let line = self.encode(&record, writer.has_ansi_escapes());
        writer.write_str(&line)
    }
}
