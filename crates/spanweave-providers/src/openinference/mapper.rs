use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use spanweave_types::{MessagePayload, Span};

use super::schema::{self, ExportRecord};

/// Map an export record onto a span.
///
/// Only a missing span id is an error; every other field degrades to absent.
pub(crate) fn map_record(record: &ExportRecord) -> Result<Span, String> {
    let span_id = record
        .get(schema::SPAN_ID)
        .and_then(id_value)
        .ok_or_else(|| "missing context.span_id".to_string())?;

    let mut span = Span::new(span_id);
    span.trace_id = record.get(schema::TRACE_ID).and_then(id_value);
    span.parent_id = record.get(schema::PARENT_ID).and_then(id_value);
    span.start_time = record.get(schema::START_TIME).and_then(timestamp);
    span.end_time = record.get(schema::END_TIME).and_then(timestamp);
    span.kind = record
        .get(schema::SPAN_KIND)
        .and_then(id_value)
        .unwrap_or_else(|| "UNKNOWN".to_string());
    span.name = record
        .get(schema::NAME)
        .and_then(id_value)
        .unwrap_or_default();
    span.metadata = record.get(schema::METADATA).map(metadata);
    span.input_messages = record
        .get(schema::INPUT_MESSAGES)
        .cloned()
        .map(MessagePayload::from);
    span.output_messages = record
        .get(schema::OUTPUT_MESSAGES)
        .cloned()
        .map(MessagePayload::from);
    span.input_value = record.get(schema::INPUT_VALUE).cloned();
    span.output_value = record.get(schema::OUTPUT_VALUE).cloned();
    Ok(span)
}

/// Identifier text; empty strings count as missing.
fn id_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Epoch milliseconds, RFC 3339, or a naive UTC date-time.
pub(crate) fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(ms) => DateTime::from_timestamp_millis(ms),
            None => {
                let ms = n.as_f64()?;
                if !ms.is_finite() {
                    return None;
                }
                DateTime::from_timestamp_micros((ms * 1000.0).round() as i64)
            }
        },
        Value::String(s) => parse_time_text(s.trim()),
        _ => None,
    }
}

fn parse_time_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Metadata exported as a JSON string is decoded when it holds an object.
fn metadata(value: &Value) -> Value {
    if let Value::String(text) = value
        && let Ok(decoded @ Value::Object(_)) = serde_json::from_str::<Value>(text)
    {
        return decoded;
    }
    value.clone()
}
