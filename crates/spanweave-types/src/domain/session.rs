use std::collections::BTreeMap;

use serde::Serialize;

use super::analysis::{ContainmentEntry, SpanComparison};
use super::forest::SpanForest;
use crate::span::Span;

/// Where a session's key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Extracted from span metadata.
    Metadata,
    /// Fallback to the trace identifier.
    Trace,
    /// Synthesized ordinal for a time window over the whole dataset.
    TimeWindow,
}

// ==========================================
// Session (reconstructed conversation)
// ==========================================

/// Reconstructed logical conversation.
///
/// A session borrows its spans from the input batch and is rebuilt on every
/// run. `forest` indexes into `spans`; `roots` and `tree` are the same
/// hierarchy keyed by span id.
#[derive(Debug, Clone, Serialize)]
pub struct Session<'a> {
    /// 1-based ordinal in discovery order.
    pub session_number: usize,
    pub session_id: String,
    pub key_source: KeySource,
    /// Sub-session number when temporal segmentation split this session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<usize>,

    /// Members ordered by start time, spans without one last.
    pub spans: Vec<&'a Span>,
    pub roots: Vec<&'a str>,
    /// Parent span id to ordered child span ids, for spans with children.
    pub tree: BTreeMap<&'a str, Vec<&'a str>>,
    #[serde(skip)]
    pub forest: SpanForest,

    pub stats: SessionStats,

    /// Comparisons of chronologically adjacent spans.
    pub comparisons: Vec<SpanComparison>,
    /// Containment of each earlier span in the last span of the session.
    pub containment: Vec<ContainmentEntry>,
}

impl<'a> Session<'a> {
    pub fn span(&self, span_id: &str) -> Option<&'a Span> {
        self.spans.iter().copied().find(|s| s.span_id == span_id)
    }

    pub fn children_of(&self, span_id: &str) -> &[&'a str] {
        self.tree.get(span_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn comparison(&self, earlier: &str, later: &str) -> Option<&SpanComparison> {
        self.comparisons
            .iter()
            .find(|c| c.earlier_span_id == earlier && c.later_span_id == later)
    }

    /// Spans in tree order with their depth.
    pub fn walk(&self) -> impl Iterator<Item = (usize, &'a Span)> + '_ {
        self.forest
            .depth_first()
            .into_iter()
            .map(|(depth, index)| (depth, self.spans[index]))
    }
}

/// Aggregated statistics for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub span_count: usize,
    /// `max(end_time) - min(start_time)` over known timestamps.
    pub duration_seconds: Option<f64>,
    pub unique_traces: usize,
    /// Spans whose metadata yielded a session id.
    pub spans_with_session_id: usize,
    pub kinds: BTreeMap<String, usize>,
    /// Sum of list-form input messages across spans.
    pub total_input_messages: usize,
    /// Characters of `input_value` across spans.
    pub total_input_chars: usize,
    /// Last span's input message count over the first span's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_factor: Option<f64>,
}

/// Shape of a whole span batch before any grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_spans: usize,
    pub distinct_sessions: usize,
    pub with_session_id: usize,
    pub without_session_id: usize,
    pub root_spans: usize,
    pub child_spans: usize,
    pub unique_traces: usize,
    pub kinds: BTreeMap<String, usize>,
    pub names: BTreeMap<String, usize>,
    /// Span count per resolved session id.
    pub sessions: BTreeMap<String, usize>,
}

impl DatasetSummary {
    /// Histogram entries sorted by count descending, then key.
    pub fn ranked(histogram: &BTreeMap<String, usize>, limit: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            histogram.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}
