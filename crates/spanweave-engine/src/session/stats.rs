use std::collections::{BTreeMap, HashSet};

use spanweave_types::{SessionStats, Span};

use crate::resolver::SessionIdResolver;

pub fn calculate_session_stats(spans: &[&Span], resolver: &SessionIdResolver) -> SessionStats {
    let start = spans.iter().filter_map(|s| s.start_time).min();
    let end = spans.iter().filter_map(|s| s.end_time).max();
    let duration_seconds = match (start, end) {
        (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
        _ => None,
    };

    let unique_traces = spans
        .iter()
        .map(|s| s.trace_key())
        .collect::<HashSet<_>>()
        .len();

    let spans_with_session_id = spans
        .iter()
        .filter(|s| matches!(resolver.resolve_span(s), Some(id) if !id.is_empty()))
        .count();

    let mut kinds = BTreeMap::new();
    for span in spans {
        *kinds.entry(span.kind.clone()).or_insert(0) += 1;
    }

    let total_input_messages = spans
        .iter()
        .filter_map(|s| s.input_message_list())
        .map(<[_]>::len)
        .sum();

    let total_input_chars = spans
        .iter()
        .filter_map(|s| s.input_value.as_ref())
        .map(|v| match v {
            serde_json::Value::String(s) => s.chars().count(),
            other => other.to_string().chars().count(),
        })
        .sum();

    SessionStats {
        span_count: spans.len(),
        duration_seconds,
        unique_traces,
        spans_with_session_id,
        kinds,
        total_input_messages,
        total_input_chars,
        growth_factor: growth_factor(spans),
    }
}

/// Input message growth from the first span to the last.
pub fn growth_factor(spans: &[&Span]) -> Option<f64> {
    if spans.len() < 2 {
        return None;
    }
    let first = spans.first()?.input_message_list()?.len();
    let last = spans.last()?.input_message_list()?.len();
    if first == 0 {
        return None;
    }
    Some(last as f64 / first as f64)
}
