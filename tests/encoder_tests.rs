use json_log_encoder::encoder::JsonRecordEncoder;
use json_log_encoder::fields::IncludeFields;
use json_log_encoder::names::{JsonText, PropertyNames};
use json_log_encoder::record::{EventId, ExceptionInfo, LogLevel, LogRecord, ORIGINAL_FORMAT_KEY};
use json_log_encoder::writer::VecWriter;
use serde_json::{json, Value};

fn encode_str(encoder: &mut JsonRecordEncoder, record: &LogRecord) -> String {
    let mut out = VecWriter::new();
    encoder.encode(record, &mut out).expect("encode failed");
    String::from_utf8(out.as_bytes().to_vec()).expect("output must be UTF-8")
}

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).expect("output must be valid JSON")
}

fn key_index(raw: &str, key: &str) -> usize {
    raw.find(&format!("\"{}\":", key))
        .unwrap_or_else(|| panic!("key {} not found in {}", key, raw))
}

#[test]
fn default_config_produces_expected_object() {
    let mut record = LogRecord::new(LogLevel::Error, "Net.Client", "timeout");
    record.scope.push(("retries".to_string(), Some(json!(3))));

    let mut encoder = JsonRecordEncoder::new();
    let raw = encode_str(&mut encoder, &record);
    let v = parse(&raw);

    assert!(v["Timestamp"].is_string());
    assert_eq!(v["LogLevel"], "Error");
    assert_eq!(v["CategoryName"], "Net.Client");
    assert_eq!(v["Message"], "timeout");
    assert_eq!(v["retries"], 3);
    // default preset excludes the event-id fields
    assert!(v.get("EventId").is_none());
    assert!(v.get("EventIdName").is_none());
}

#[test]
fn key_order_is_fixed() {
    let mut record = LogRecord::new(LogLevel::Warning, "app", "hello");
    record.event_id = EventId::new(9, "Started");
    record.scope.push(("scope_key".to_string(), Some(json!(1))));
    record.params.push(("param_key".to_string(), Some(json!(2))));
    record.exception = Some(ExceptionInfo {
        type_name: Some("IoError".to_string()),
        ..Default::default()
    });

    let mut encoder = JsonRecordEncoder::new().with_include_fields(IncludeFields::ALL);
    let raw = encode_str(&mut encoder, &record);

    let order = [
        "Timestamp",
        "LogLevel",
        "CategoryName",
        "EventId",
        "EventIdName",
        "Exception",
        "Message",
        "scope_key",
        "param_key",
    ];
    let positions: Vec<usize> = order.iter().map(|k| key_index(&raw, k)).collect();
    for pair in positions.windows(2) {
        assert!(pair[0] < pair[1], "key order violated in {}", raw);
    }
}

#[test]
fn cleared_flags_omit_keys_entirely() {
    let mut record = LogRecord::new(LogLevel::Information, "app", "hi");
    record.scope.push(("s".to_string(), Some(json!(1))));
    record.params.push(("p".to_string(), Some(json!(2))));

    let fields = IncludeFields::DEFAULT
        .without(IncludeFields::TIMESTAMP)
        .without(IncludeFields::MESSAGE)
        .without(IncludeFields::SCOPE_KEY_VALUES)
        .without(IncludeFields::PARAMETER_KEY_VALUES);
    let mut encoder = JsonRecordEncoder::new().with_include_fields(fields);
    let raw = encode_str(&mut encoder, &record);
    let v = parse(&raw);

    assert!(v.get("Timestamp").is_none());
    assert!(v.get("Message").is_none());
    assert!(v.get("s").is_none());
    assert!(v.get("p").is_none());
    assert_eq!(v["LogLevel"], "Information");
}

#[test]
fn exception_selected_but_absent_encodes_null() {
    let record = LogRecord::new(LogLevel::Error, "app", "boom");
    let mut encoder = JsonRecordEncoder::new();
    let raw = encode_str(&mut encoder, &record);

    assert!(raw.contains("\"Exception\":null"), "got {}", raw);
}

#[test]
fn exception_flag_cleared_omits_key() {
    let mut record = LogRecord::new(LogLevel::Error, "app", "boom");
    record.exception = Some(ExceptionInfo::default());
    let mut encoder = JsonRecordEncoder::new()
        .with_include_fields(IncludeFields::DEFAULT.without(IncludeFields::EXCEPTION));
    let raw = encode_str(&mut encoder, &record);

    assert!(!raw.contains("\"Exception\""), "got {}", raw);
}

#[test]
fn exception_node_has_exactly_four_keys() {
    let mut record = LogRecord::new(LogLevel::Error, "app", "boom");
    record.exception = Some(ExceptionInfo {
        type_name: Some("TimeoutError".to_string()),
        message: Some("deadline exceeded".to_string()),
        stack_trace: None,
        inner: None,
    });
    let mut encoder = JsonRecordEncoder::new();
    let v = parse(&encode_str(&mut encoder, &record));

    let ex = v["Exception"].as_object().expect("exception object");
    assert_eq!(ex.len(), 4);
    assert_eq!(ex["Name"], "TimeoutError");
    assert_eq!(ex["Message"], "deadline exceeded");
    assert_eq!(ex["StackTrace"], Value::Null);
    assert_eq!(ex["InnerException"], Value::Null);
}

#[test]
fn exception_chain_of_depth_50_nests_without_truncation() {
    let mut ex = ExceptionInfo {
        type_name: Some("E0".to_string()),
        ..Default::default()
    };
    for i in 1..50 {
        ex = ExceptionInfo {
            type_name: Some(format!("E{}", i)),
            inner: Some(Box::new(ex)),
            ..Default::default()
        };
    }
    let mut record = LogRecord::new(LogLevel::Critical, "app", "deep");
    record.exception = Some(ex);

    let mut encoder = JsonRecordEncoder::new();
    let v = parse(&encode_str(&mut encoder, &record));

    let mut depth = 0;
    let mut cursor = &v["Exception"];
    while cursor.is_object() {
        depth += 1;
        cursor = &cursor["InnerException"];
    }
    assert_eq!(depth, 50);
    assert_eq!(*cursor, Value::Null);
    assert_eq!(v["Exception"]["Name"], "E49");
}

#[test]
fn original_format_scope_key_never_appears() {
    let mut record = LogRecord::new(LogLevel::Debug, "app", "tpl");
    record
        .scope
        .push((ORIGINAL_FORMAT_KEY.to_string(), Some(json!("user {id} logged in"))));
    record.scope.push(("id".to_string(), Some(json!(7))));

    let mut encoder = JsonRecordEncoder::new();
    let raw = encode_str(&mut encoder, &record);

    assert!(!raw.contains("OriginalFormat"), "got {}", raw);
    assert_eq!(parse(&raw)["id"], 7);
}

#[test]
fn custom_level_encodes_as_integer_text() {
    let record = LogRecord::new(LogLevel::Custom(13), "app", "odd");
    let mut encoder = JsonRecordEncoder::new();
    let v = parse(&encode_str(&mut encoder, &record));

    assert_eq!(v["LogLevel"], "13");
}

#[test]
fn event_id_fields_encode_when_selected() {
    let mut record = LogRecord::new(LogLevel::Information, "app", "go");
    record.event_id = EventId::new(1001, "RequestStarted");

    let mut encoder = JsonRecordEncoder::new().with_include_fields(IncludeFields::ALL);
    let v = parse(&encode_str(&mut encoder, &record));

    assert_eq!(v["EventId"], 1001);
    assert_eq!(v["EventIdName"], "RequestStarted");
}

#[test]
fn unnamed_event_id_encodes_empty_string() {
    let mut record = LogRecord::new(LogLevel::Information, "app", "go");
    record.event_id = EventId { id: 5, name: None };

    let mut encoder = JsonRecordEncoder::new().with_include_fields(IncludeFields::ALL);
    let v = parse(&encode_str(&mut encoder, &record));

    assert_eq!(v["EventIdName"], "");
}

#[test]
fn encoder_reuse_does_not_leak_between_records() {
    let mut a = LogRecord::new(LogLevel::Error, "cat.a", "first");
    a.scope.push(("only_in_a".to_string(), Some(json!("alpha"))));
    let mut b = LogRecord::new(LogLevel::Warning, "cat.b", "second");
    b.scope.push(("only_in_b".to_string(), Some(json!("beta"))));

    let mut encoder = JsonRecordEncoder::new();
    let raw_a = encode_str(&mut encoder, &a);
    let raw_b = encode_str(&mut encoder, &b);

    assert!(raw_a.contains("only_in_a") && !raw_a.contains("only_in_b"));
    assert!(raw_b.contains("only_in_b") && !raw_b.contains("only_in_a"));
    assert_eq!(parse(&raw_b)["Message"], "second");
}

#[test]
fn null_pair_values_encode_as_null() {
    let mut record = LogRecord::new(LogLevel::Debug, "app", "m");
    record.scope.push(("missing".to_string(), None));
    record.params.push(("also_missing".to_string(), None));

    let mut encoder = JsonRecordEncoder::new();
    let v = parse(&encode_str(&mut encoder, &record));

    assert_eq!(v["missing"], Value::Null);
    assert_eq!(v["also_missing"], Value::Null);
}

#[test]
fn parameters_nest_under_configured_object_name() {
    let mut record = LogRecord::new(LogLevel::Information, "app", "m");
    record.params.push(("user_id".to_string(), Some(json!(42))));
    record.params.push(("attempt".to_string(), Some(json!(2))));

    let mut encoder = JsonRecordEncoder::new().with_parameters_object_name("Payload");
    let v = parse(&encode_str(&mut encoder, &record));

    assert_eq!(v["Payload"]["user_id"], 42);
    assert_eq!(v["Payload"]["attempt"], 2);
    assert!(v.get("user_id").is_none());
}

#[test]
fn parameters_flatten_by_default() {
    let mut record = LogRecord::new(LogLevel::Information, "app", "m");
    record.params.push(("user_id".to_string(), Some(json!(42))));

    let mut encoder = JsonRecordEncoder::new();
    let v = parse(&encode_str(&mut encoder, &record));

    assert_eq!(v["user_id"], 42);
}

#[test]
fn additional_fields_hook_lands_between_scope_and_params() {
    let mut record = LogRecord::new(LogLevel::Information, "app", "m");
    record.scope.push(("scope_key".to_string(), Some(json!(1))));
    record.params.push(("param_key".to_string(), Some(json!(2))));

    let mut encoder = JsonRecordEncoder::new()
        .with_additional_fields(|json, record| json.entry("host", &record.category));
    let raw = encode_str(&mut encoder, &record);

    let scope_at = key_index(&raw, "scope_key");
    let host_at = key_index(&raw, "host");
    let param_at = key_index(&raw, "param_key");
    assert!(scope_at < host_at && host_at < param_at, "got {}", raw);
    assert_eq!(parse(&raw)["host"], "app");
}

// The hook is not checked against reserved names; a colliding key is
// written as a duplicate member, not deduplicated.
#[test]
fn hook_key_collisions_produce_duplicate_members() {
    let record = LogRecord::new(LogLevel::Information, "app", "original");
    let mut encoder = JsonRecordEncoder::new()
        .with_additional_fields(|json, _| json.entry("Message", &"shadow"));
    let raw = encode_str(&mut encoder, &record);

    assert_eq!(raw.matches("\"Message\":").count(), 2, "got {}", raw);
}

#[test]
fn property_name_table_swaps_without_rebuilding_encoder() {
    let record = LogRecord::new(LogLevel::Error, "app", "m");
    let mut encoder = JsonRecordEncoder::new();
    let before = encode_str(&mut encoder, &record);
    assert!(before.contains("\"LogLevel\":"));

    let names = PropertyNames {
        log_level: JsonText::encode("severity"),
        level_error: JsonText::encode("err"),
        ..Default::default()
    };
    encoder.set_property_names(names);
    let after = encode_str(&mut encoder, &record);

    assert!(after.contains("\"severity\":\"err\""), "got {}", after);
    assert!(!after.contains("\"LogLevel\":"), "got {}", after);
}

#[test]
fn utc_timestamps_carry_zero_offset() {
    let record = LogRecord::new(LogLevel::Information, "app", "m");
    let mut encoder = JsonRecordEncoder::new().with_utc_timestamp(true);
    let v = parse(&encode_str(&mut encoder, &record));

    let ts = v["Timestamp"].as_str().expect("timestamp string");
    assert!(ts.ends_with("+00:00"), "got {}", ts);
}

#[test]
fn returned_byte_count_matches_output_length() {
    let mut record = LogRecord::new(LogLevel::Information, "app", "m");
    record.params.push(("k".to_string(), Some(json!({"nested": [1, 2, 3]}))));

    let mut encoder = JsonRecordEncoder::new();
    let mut out = VecWriter::new();
    let written = encoder.encode(&record, &mut out).expect("encode failed");

    assert_eq!(written, out.as_bytes().len());
    assert_eq!(written, out.len());
}

#[test]
fn escaped_text_survives_round_trip() {
    let mut record = LogRecord::new(LogLevel::Information, "quo\"ted", "line\nbreak\t\"quote\"");
    record.scope.push(("we\"ird\nkey".to_string(), Some(json!("va\\lue"))));

    let mut encoder = JsonRecordEncoder::new();
    let v = parse(&encode_str(&mut encoder, &record));

    assert_eq!(v["CategoryName"], "quo\"ted");
    assert_eq!(v["Message"], "line\nbreak\t\"quote\"");
    assert_eq!(v["we\"ird\nkey"], "va\\lue");
}
