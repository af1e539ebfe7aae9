use chrono::{DateTime, Local, Utc};
use serde_json::Value;

/// Scope key used by message-template style logging for the original
/// template text. It is metadata, not a real scope value, and the
/// encoder drops it from scope output.
pub const ORIGINAL_FORMAT_KEY: &str = "{OriginalFormat}";

/// Severity of a log record, ordered from least to most severe.
///
/// `Custom` carries numeric levels outside the named set; they encode
/// as the integer's text form instead of a token.
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
    None,
    Custom(i32),
}

impl LogLevel {
    /// Numeric value of the level, used for ordering and for encoding
    /// unmapped levels.
    pub fn value(self) -> i32 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 1,
            LogLevel::Information => 2,
            LogLevel::Warning => 3,
            LogLevel::Error => 4,
            LogLevel::Critical => 5,
            LogLevel::None => 6,
            LogLevel::Custom(v) => v,
        }
    }
}

impl PartialEq for LogLevel {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Eq for LogLevel {}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

/// Numeric event identifier with an optional symbolic name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventId {
    pub id: i64,
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: Some(name.into()) }
    }
}

/// One node of an exception chain. All text fields are optional; the
/// chain itself is acyclic by construction and may be arbitrarily deep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: Option<String>,
    pub message: Option<String>,
    pub stack_trace: Option<String>,
    pub inner: Option<Box<ExceptionInfo>>,
}

impl ExceptionInfo {
    /// Build a chain from a standard error and its `source()` chain.
    /// Type names are not recoverable from `dyn Error`, so only the
    /// messages are captured.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            type_name: None,
            message: Some(err.to_string()),
            stack_trace: None,
            inner: err.source().map(|s| Box::new(Self::from_error(s))),
        }
    }
}

/// Immutable snapshot of one log event, as handed to the encoder.
///
/// Scope and parameter pairs keep their insertion order; values are
/// `serde_json::Value` so arbitrary payloads survive the trip from the
/// producing layer.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub category: String,
    pub event_id: EventId,
    /// Rendered message text.
    pub message: String,
    pub exception: Option<ExceptionInfo>,
    pub scope: Vec<(String, Option<Value>)>,
    pub params: Vec<(String, Option<Value>)>,
}

impl LogRecord {
    pub fn new(level: LogLevel, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            category: category.into(),
            event_id: EventId::default(),
            message: message.into(),
            exception: None,
            scope: Vec::new(),
            params: Vec::new(),
        }
    }

    pub(crate) fn local_timestamp(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }
}
