use crate::record::LogLevel;

/// A key or token pre-encoded as a quoted, escaped JSON string.
///
/// Encoding happens once, when the owning table is built, so the per
/// record cost of a property name is a plain byte copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonText {
    bytes: Box<[u8]>,
}

impl JsonText {
    pub fn encode(text: &str) -> Self {
        let mut bytes = Vec::with_capacity(text.len() + 2);
        // serializing a str to a Vec cannot fail
        serde_json::to_writer(&mut bytes, text).expect("string encoding to Vec");
        Self { bytes: bytes.into_boxed_slice() }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Externally visible key text for every semantic field, plus one token
/// per severity level. Immutable once built; swap the whole table on an
/// encoder to rename or localize the output.
#[derive(Debug, Clone)]
pub struct PropertyNames {
    pub timestamp: JsonText,
    pub log_level: JsonText,
    pub category: JsonText,
    pub event_id: JsonText,
    pub event_id_name: JsonText,
    pub message: JsonText,
    pub exception: JsonText,

    pub exception_name: JsonText,
    pub exception_message: JsonText,
    pub exception_stack_trace: JsonText,
    pub exception_inner: JsonText,

    pub level_trace: JsonText,
    pub level_debug: JsonText,
    pub level_information: JsonText,
    pub level_warning: JsonText,
    pub level_error: JsonText,
    pub level_critical: JsonText,
    pub level_none: JsonText,
}

impl PropertyNames {
    /// Token for a named level; `None` for levels outside the named
    /// set, which encode as their integer value instead.
    pub fn level_token(&self, level: LogLevel) -> Option<&JsonText> {
        match level {
            LogLevel::Trace => Some(&self.level_trace),
            LogLevel::Debug => Some(&self.level_debug),
            LogLevel::Information => Some(&self.level_information),
            LogLevel::Warning => Some(&self.level_warning),
            LogLevel::Error => Some(&self.level_error),
            LogLevel::Critical => Some(&self.level_critical),
            LogLevel::None => Some(&self.level_none),
            LogLevel::Custom(_) => None,
        }
    }
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            timestamp: JsonText::encode("Timestamp"),
            log_level: JsonText::encode("LogLevel"),
            category: JsonText::encode("CategoryName"),
            event_id: JsonText::encode("EventId"),
            event_id_name: JsonText::encode("EventIdName"),
            message: JsonText::encode("Message"),
            exception: JsonText::encode("Exception"),

            exception_name: JsonText::encode("Name"),
            exception_message: JsonText::encode("Message"),
            exception_stack_trace: JsonText::encode("StackTrace"),
            exception_inner: JsonText::encode("InnerException"),

            level_trace: JsonText::encode("Trace"),
            level_debug: JsonText::encode("Debug"),
            level_information: JsonText::encode("Information"),
            level_warning: JsonText::encode("Warning"),
            level_error: JsonText::encode("Error"),
            level_critical: JsonText::encode("Critical"),
            level_none: JsonText::encode("None"),
        }
    }
}
