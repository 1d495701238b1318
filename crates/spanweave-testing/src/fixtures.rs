//! Span fixtures.
//!
//! `SpanBuilder` produces in-memory spans for engine tests; `SampleFiles`
//! turns the same spans into OpenInference export lines for provider and CLI
//! tests.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Map, Value, json};
use spanweave_types::{MessagePayload, Span};
use std::fs;
use std::path::Path;

/// Fixed origin for fixture timestamps: 2025-01-15T10:00:00Z.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Fluent span constructor. Times are seconds from [`base_time`].
#[derive(Debug, Clone)]
pub struct SpanBuilder {
    span: Span,
}

impl SpanBuilder {
    pub fn new(span_id: &str) -> Self {
        let mut span = Span::new(span_id);
        span.kind = "LLM".to_string();
        span.name = "ChatCompletion".to_string();
        Self { span }
    }

    pub fn trace(mut self, trace_id: &str) -> Self {
        self.span.trace_id = Some(trace_id.to_string());
        self
    }

    pub fn parent(mut self, parent_id: &str) -> Self {
        self.span.parent_id = Some(parent_id.to_string());
        self
    }

    /// Start `offset` seconds after the base time, lasting one second.
    pub fn at(mut self, offset: i64) -> Self {
        let start = base_time() + Duration::seconds(offset);
        self.span.start_time = Some(start);
        self.span.end_time = Some(start + Duration::seconds(1));
        self
    }

    pub fn lasting(mut self, seconds: i64) -> Self {
        if let Some(start) = self.span.start_time {
            self.span.end_time = Some(start + Duration::seconds(seconds));
        }
        self
    }

    pub fn no_start(mut self) -> Self {
        self.span.start_time = None;
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.span.kind = kind.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.span.name = name.to_string();
        self
    }

    /// Tag with a LiteLLM-style `user_id` carrying `session_<id>`.
    pub fn session(self, session_id: &str) -> Self {
        self.metadata(json!({ "user_id": format!("user_session_{session_id}") }))
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.span.metadata = Some(metadata);
        self
    }

    pub fn input_messages(mut self, messages: Vec<Value>) -> Self {
        self.span.input_messages = Some(MessagePayload::List(messages));
        self
    }

    pub fn input_value(mut self, value: &str) -> Self {
        self.span.input_value = Some(Value::String(value.to_string()));
        self
    }

    pub fn output_value(mut self, value: &str) -> Self {
        self.span.output_value = Some(Value::String(value.to_string()));
        self
    }

    pub fn build(self) -> Span {
        self.span
    }
}

/// Chat message record.
pub fn message(role: &str, content: &str) -> Value {
    json!({ "role": role, "content": content })
}

/// One trace `T1`: spans 1-3 are roots, 4 and 5 are children of 2 with 5
/// written before 4 but starting after it.
pub fn single_trace_forest() -> Vec<Span> {
    vec![
        SpanBuilder::new("1").trace("T1").at(0).build(),
        SpanBuilder::new("2").trace("T1").at(10).lasting(30).kind("CHAIN").build(),
        SpanBuilder::new("3").trace("T1").at(50).build(),
        SpanBuilder::new("5").trace("T1").parent("2").at(20).kind("TOOL").build(),
        SpanBuilder::new("4").trace("T1").parent("2").at(15).kind("TOOL").build(),
    ]
}

/// Two tagged conversations spread across three traces, plus one untagged trace.
///
/// Session `alpha` grows its transcript turn by turn; session `beta` drops its
/// first message on the second turn.
pub fn multi_session_dataset() -> Vec<Span> {
    let hi = message("user", "hi");
    let hello = message("assistant", "hello");
    let next = message("user", "what is the weather");
    let q = message("user", "refund order 42");
    let a = message("assistant", "refund issued");

    vec![
        SpanBuilder::new("a1")
            .trace("TA1")
            .at(0)
            .session("alpha")
            .input_messages(vec![hi.clone()])
            .input_value("hi")
            .build(),
        SpanBuilder::new("b1")
            .trace("TB1")
            .at(5)
            .session("beta")
            .input_messages(vec![q.clone()])
            .input_value("refund order 42")
            .build(),
        SpanBuilder::new("a2")
            .trace("TA2")
            .at(30)
            .session("alpha")
            .input_messages(vec![hi.clone(), hello.clone(), next.clone()])
            .input_value("what is the weather")
            .output_value("Sunny")
            .build(),
        SpanBuilder::new("a2-tool")
            .trace("TA2")
            .parent("a2")
            .at(31)
            .kind("TOOL")
            .name("weather_lookup")
            .session("alpha")
            .build(),
        SpanBuilder::new("b2")
            .trace("TB1")
            .at(40)
            .session("beta")
            .input_messages(vec![a.clone()])
            .build(),
        SpanBuilder::new("x1").trace("TX").at(60).kind("CHAIN").build(),
    ]
}

/// OpenInference export record (dotted keys, epoch-millisecond times) for a span.
pub fn openinference_record(span: &Span) -> Value {
    let mut record = Map::new();
    record.insert("context.span_id".into(), json!(span.span_id));
    insert_opt(&mut record, "context.trace_id", span.trace_id.as_ref().map(|t| json!(t)));
    record.insert(
        "parent_id".into(),
        span.parent_id.as_ref().map_or(Value::Null, |p| json!(p)),
    );
    record.insert("name".into(), json!(span.name));
    record.insert("span_kind".into(), json!(span.kind));
    insert_opt(
        &mut record,
        "start_time",
        span.start_time.map(|t| json!(t.timestamp_millis())),
    );
    insert_opt(
        &mut record,
        "end_time",
        span.end_time.map(|t| json!(t.timestamp_millis())),
    );
    insert_opt(&mut record, "attributes.metadata", span.metadata.clone());
    insert_opt(
        &mut record,
        "attributes.llm.input_messages",
        span.input_messages.as_ref().map(payload_value),
    );
    insert_opt(
        &mut record,
        "attributes.llm.output_messages",
        span.output_messages.as_ref().map(payload_value),
    );
    insert_opt(&mut record, "attributes.input.value", span.input_value.clone());
    insert_opt(&mut record, "attributes.output.value", span.output_value.clone());
    Value::Object(record)
}

fn insert_opt(record: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        record.insert(key.to_string(), value);
    }
}

fn payload_value(payload: &MessagePayload) -> Value {
    match payload {
        MessagePayload::List(items) => Value::Array(items.clone()),
        MessagePayload::Raw(value) => value.clone(),
    }
}

/// Writes fixture exports to disk.
pub struct SampleFiles;

impl SampleFiles {
    /// One OpenInference record per line.
    pub fn write_ndjson(path: &Path, spans: &[Span]) -> Result<()> {
        let lines: Vec<String> = spans
            .iter()
            .map(|s| openinference_record(s).to_string())
            .collect();
        Self::write_lines(path, &lines)
    }

    /// Raw lines, for malformed-input cases.
    pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    /// A single JSON array of records.
    pub fn write_json_array(path: &Path, spans: &[Span]) -> Result<()> {
        let records: Vec<Value> = spans.iter().map(openinference_record).collect();
        fs::write(path, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }
}
