use serde_json::Value;
use spanweave_types::Span;

use crate::resolver::SessionIdResolver;

/// Span selection for ad-hoc queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanFilter {
    /// Case-insensitive substring of the input or output value.
    Search(String),
    /// Exact session key: resolved session id, else trace id.
    SessionId(String),
}

pub fn filter_spans<'a>(
    spans: &'a [Span],
    filter: &SpanFilter,
    resolver: &SessionIdResolver,
) -> Vec<&'a Span> {
    match filter {
        SpanFilter::Search(needle) => {
            let needle = needle.to_lowercase();
            spans
                .iter()
                .filter(|span| {
                    [&span.input_value, &span.output_value]
                        .into_iter()
                        .flatten()
                        .any(|value| text_of(value).to_lowercase().contains(&needle))
                })
                .collect()
        }
        SpanFilter::SessionId(id) => spans
            .iter()
            .filter(|span| resolver.session_key(span).0 == id.as_str())
            .collect(),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
