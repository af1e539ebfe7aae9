use std::fmt::Write as _;

use serde_json::Value;

use crate::error::EncodeError;
use crate::fields::IncludeFields;
use crate::mutator::{write_key, KeyNameMutator, KEY_SCRATCH_LEN};
use crate::names::{JsonText, PropertyNames};
use crate::record::{ExceptionInfo, LogRecord, ORIGINAL_FORMAT_KEY};
use crate::writer::{BufferWriter, JsonWriter};

/// Caller-supplied hook that may append extra members to the output
/// object. It runs after the reserved fields and before parameter
/// pairs; keys it writes are not checked against the reserved names.
pub type AdditionalFields =
    Box<dyn Fn(&mut JsonWriter<'_>, &LogRecord) -> Result<(), EncodeError> + Send>;

/// Encodes one [`LogRecord`] per call into exactly one compact JSON
/// object on a caller-supplied [`BufferWriter`].
///
/// Configuration lives on the instance and may be swapped between
/// calls. Scratch state is reset, not reallocated, per call, which is
/// also why an instance must not be shared by concurrent encode calls;
/// give each worker its own encoder.
pub struct JsonRecordEncoder {
    include_fields: IncludeFields,
    property_names: PropertyNames,
    use_utc_timestamp: bool,
    key_name_mutator: Option<Box<dyn KeyNameMutator + Send>>,
    parameters_object_name: Option<JsonText>,
    additional_fields: Option<AdditionalFields>,

    // per-call scratch, reused across calls
    key_scratch: [u8; KEY_SCRATCH_LEN],
    text: String,
}

impl Default for JsonRecordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRecordEncoder {
    /// Encoder with the default field set, English property names and
    /// local timestamps.
    pub fn new() -> Self {
        Self {
            include_fields: IncludeFields::DEFAULT,
            property_names: PropertyNames::default(),
            use_utc_timestamp: false,
            key_name_mutator: None,
            parameters_object_name: None,
            additional_fields: None,
            key_scratch: [0; KEY_SCRATCH_LEN],
            text: String::new(),
        }
    }

    pub fn with_include_fields(mut self, fields: IncludeFields) -> Self {
        self.include_fields = fields;
        self
    }

    pub fn with_property_names(mut self, names: PropertyNames) -> Self {
        self.property_names = names;
        self
    }

    /// Emit UTC timestamps instead of local ones.
    pub fn with_utc_timestamp(mut self, use_utc: bool) -> Self {
        self.use_utc_timestamp = use_utc;
        self
    }

    pub fn with_key_name_mutator(mut self, mutator: impl KeyNameMutator + Send + 'static) -> Self {
        self.key_name_mutator = Some(Box::new(mutator));
        self
    }

    /// Nest parameter pairs under `name` instead of flattening them
    /// into the top-level object.
    pub fn with_parameters_object_name(mut self, name: &str) -> Self {
        self.parameters_object_name = Some(JsonText::encode(name));
        self
    }

    pub fn with_additional_fields(
        mut self,
        hook: impl Fn(&mut JsonWriter<'_>, &LogRecord) -> Result<(), EncodeError> + Send + 'static,
    ) -> Self {
        self.additional_fields = Some(Box::new(hook));
        self
    }

    /// Replace the field selection between calls.
    pub fn set_include_fields(&mut self, fields: IncludeFields) {
        self.include_fields = fields;
    }

    /// Replace the name table between calls. Scratch state is
    /// untouched, so this is cheap.
    pub fn set_property_names(&mut self, names: PropertyNames) {
        self.property_names = names;
    }

    /// Encodes `record` as one JSON object and returns the number of
    /// bytes committed to `out`.
    ///
    /// On error the buffer may hold a partial object; the caller is
    /// expected to discard or reset it.
    pub fn encode(
        &mut self,
        record: &LogRecord,
        out: &mut dyn BufferWriter,
    ) -> Result<usize, EncodeError> {
        let flags = self.include_fields;
        let names = &self.property_names;
        let mutator = self.key_name_mutator.as_deref().map(|m| m as &dyn KeyNameMutator);
        let scratch = &mut self.key_scratch;
        let text = &mut self.text;

        let mut json = JsonWriter::new(out);
        json.begin_object()?;

        if flags.contains(IncludeFields::TIMESTAMP) {
            json.key_encoded(&names.timestamp)?;
            text.clear();
            if self.use_utc_timestamp {
                let _ = write!(text, "{}", record.timestamp.format("%+"));
            } else {
                let _ = write!(text, "{}", record.local_timestamp().format("%+"));
            }
            json.string_value(text)?;
        }

        if flags.contains(IncludeFields::LOG_LEVEL) {
            json.key_encoded(&names.log_level)?;
            match names.level_token(record.level) {
                Some(token) => json.value_encoded(token)?,
                None => {
                    text.clear();
                    let _ = write!(text, "{}", record.level.value());
                    json.string_value(text)?;
                }
            }
        }

        if flags.contains(IncludeFields::CATEGORY_NAME) {
            json.key_encoded(&names.category)?;
            json.string_value(&record.category)?;
        }

        if flags.contains(IncludeFields::EVENT_ID_VALUE) {
            json.key_encoded(&names.event_id)?;
            json.value(&record.event_id.id)?;
        }

        if flags.contains(IncludeFields::EVENT_ID_NAME) {
            json.key_encoded(&names.event_id_name)?;
            json.string_value(record.event_id.name.as_deref().unwrap_or(""))?;
        }

        if flags.contains(IncludeFields::EXCEPTION) {
            json.key_encoded(&names.exception)?;
            write_exception(&mut json, names, record.exception.as_ref())?;
        }

        if flags.contains(IncludeFields::MESSAGE) {
            json.key_encoded(&names.message)?;
            json.string_value(&record.message)?;
        }

        if flags.contains(IncludeFields::SCOPE_KEY_VALUES) {
            write_pairs(&mut json, &record.scope, mutator, scratch, true)?;
        }

        if let Some(hook) = self.additional_fields.as_ref() {
            hook(&mut json, record)?;
        }

        if flags.contains(IncludeFields::PARAMETER_KEY_VALUES) {
            match &self.parameters_object_name {
                Some(name) => {
                    json.key_encoded(name)?;
                    json.begin_object()?;
                    write_pairs(&mut json, &record.params, mutator, scratch, false)?;
                    json.end_object()?;
                }
                None => write_pairs(&mut json, &record.params, mutator, scratch, false)?,
            }
        }

        json.end_object()?;
        Ok(json.finish())
    }
}

fn write_pairs(
    json: &mut JsonWriter<'_>,
    pairs: &[(String, Option<Value>)],
    mutator: Option<&dyn KeyNameMutator>,
    scratch: &mut [u8; KEY_SCRATCH_LEN],
    skip_original_format: bool,
) -> Result<(), EncodeError> {
    for (key, value) in pairs {
        // the message template travels as a scope pair under this key
        if skip_original_format && key == ORIGINAL_FORMAT_KEY {
            continue;
        }
        write_key(json, key, mutator, scratch)?;
        match value {
            Some(v) => json.value(v)?,
            None => json.null_value()?,
        }
    }
    Ok(())
}

/// Walks the chain opening one object per level, then closes them all.
/// Iterative so a deep chain cannot overflow the stack.
fn write_exception(
    json: &mut JsonWriter<'_>,
    names: &PropertyNames,
    exception: Option<&ExceptionInfo>,
) -> Result<(), EncodeError> {
    let mut depth = 0usize;
    let mut current = exception;
    loop {
        match current {
            None => {
                json.null_value()?;
                break;
            }
            Some(ex) => {
                json.begin_object()?;
                json.key_encoded(&names.exception_name)?;
                write_opt_string(json, ex.type_name.as_deref())?;
                json.key_encoded(&names.exception_message)?;
                write_opt_string(json, ex.message.as_deref())?;
                json.key_encoded(&names.exception_stack_trace)?;
                write_opt_string(json, ex.stack_trace.as_deref())?;
                json.key_encoded(&names.exception_inner)?;
                current = ex.inner.as_deref();
                depth += 1;
            }
        }
    }
    for _ in 0..depth {
        json.end_object()?;
    }
    Ok(())
}

fn write_opt_string(json: &mut JsonWriter<'_>, value: Option<&str>) -> Result<(), EncodeError> {
    match value {
        Some(s) => json.string_value(s),
        None => json.null_value(),
    }
}
