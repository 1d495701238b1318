use std::collections::{BTreeMap, HashSet};

use spanweave_types::{DatasetSummary, Span};

use crate::resolver::SessionIdResolver;

/// Shape of a span batch: session coverage, hierarchy and label histograms.
pub fn summarize_dataset(spans: &[Span], resolver: &SessionIdResolver) -> DatasetSummary {
    let mut summary = DatasetSummary {
        total_spans: spans.len(),
        ..DatasetSummary::default()
    };
    let mut traces = HashSet::new();

    for span in spans {
        match resolver.resolve_span(span) {
            Some(id) if !id.is_empty() => {
                summary.with_session_id += 1;
                *summary.sessions.entry(id.to_string()).or_insert(0) += 1;
            }
            _ => summary.without_session_id += 1,
        }

        if span.is_root() {
            summary.root_spans += 1;
        } else {
            summary.child_spans += 1;
        }

        traces.insert(span.trace_key());
        bump(&mut summary.kinds, &span.kind);
        bump(&mut summary.names, &span.name);
    }

    summary.distinct_sessions = summary.sessions.len();
    summary.unique_traces = traces.len();
    summary
}

fn bump(histogram: &mut BTreeMap<String, usize>, key: &str) {
    *histogram.entry(key.to_string()).or_insert(0) += 1;
}
