use std::cell::OnceCell;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Group key used for spans that carry no trace identifier.
pub const UNKNOWN_TRACE: &str = "unknown";

/// Message payload attached to a span.
///
/// Tracing clients record LLM messages either as an ordered list of records
/// (usually role/content pairs) or as a single opaque value such as a raw
/// string. Only the list form takes part in containment analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessagePayload {
    List(Vec<Value>),
    Raw(Value),
}

impl MessagePayload {
    /// Ordered message records, if the payload is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            MessagePayload::List(items) => Some(items),
            MessagePayload::Raw(_) => None,
        }
    }

    /// Number of messages for a list, or 1 for an opaque value.
    pub fn len(&self) -> usize {
        match self {
            MessagePayload::List(items) => items.len(),
            MessagePayload::Raw(Value::Null) => 0,
            MessagePayload::Raw(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Value> for MessagePayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => MessagePayload::List(items),
            other => MessagePayload::Raw(other),
        }
    }
}

/// One traced unit of work.
///
/// Spans are built once per input record. After construction the only state
/// that changes is the resolved session tag, which is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_messages: Option<MessagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_messages: Option<MessagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_value: Option<Value>,

    #[serde(skip)]
    session_tag: OnceCell<Option<String>>,
}

impl Span {
    pub fn new(span_id: impl Into<String>) -> Self {
        Self {
            span_id: span_id.into(),
            ..Self::default()
        }
    }

    /// Trace identifier, or the `unknown` sentinel when missing.
    pub fn trace_key(&self) -> &str {
        self.trace_id.as_deref().unwrap_or(UNKNOWN_TRACE)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Duration in seconds when both timestamps are known.
    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }

    /// Input messages as an ordered list, if recorded that way.
    pub fn input_message_list(&self) -> Option<&[Value]> {
        self.input_messages.as_ref().and_then(MessagePayload::as_list)
    }

    /// Resolved session id, computed by `resolve` on first access and cached.
    pub fn session_tag_or_init<F>(&self, resolve: F) -> Option<&str>
    where
        F: FnOnce(&Span) -> Option<String>,
    {
        self.session_tag.get_or_init(|| resolve(self)).as_deref()
    }

    /// Cached session id, if the resolver has already run for this span.
    pub fn cached_session_tag(&self) -> Option<Option<&str>> {
        self.session_tag.get().map(Option::as_deref)
    }
}

/// Chronological order on `start_time`; spans without a start sort last.
///
/// Equal keys compare as `Equal`, so a stable sort keeps input order for ties.
pub fn cmp_start_time(a: &Span, b: &Span) -> Ordering {
    match (a.start_time, b.start_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
