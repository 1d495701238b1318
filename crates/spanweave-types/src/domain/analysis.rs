use serde::{Deserialize, Serialize};

/// Overlap between the message lists of two spans.
///
/// Messages are held in canonical text form so the duplicate and new-message
/// lists can be printed or exported without re-normalizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageComparison {
    /// Messages in the earlier span.
    pub total_previous: usize,
    /// Messages in the later span.
    pub total_current: usize,
    /// Earlier messages that reappear in the later span.
    pub duplicated_count: usize,
    /// Later messages not present in the earlier span.
    pub new_count: usize,
    /// `duplicated_count / total_current * 100`, or 0 for an empty later span.
    pub overlap_percentage: f64,
    pub duplicated_messages: Vec<String>,
    pub new_messages: Vec<String>,
}

/// Whether every message of an earlier span reappears in a later one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainmentCheck {
    /// True only when nothing is missing and the earlier list is non-empty.
    pub is_complete_subset: bool,
    pub total_earlier: usize,
    pub contained_count: usize,
    pub missing_count: usize,
    /// `contained_count / total_earlier * 100`, or 0 for an empty earlier span.
    pub containment_percentage: f64,
    pub missing_messages: Vec<String>,
}

/// How content moved between two turns of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPattern {
    /// The later span re-sends the whole earlier transcript plus new content.
    Accumulation,
    /// The later span repeats the earlier content and adds nothing.
    Duplication,
    /// Some earlier content is absent from the later span.
    Loss,
    /// No earlier content to carry over.
    Disjoint,
}

/// Comparison of two chronologically adjacent spans in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanComparison {
    pub earlier_span_id: String,
    pub later_span_id: String,
    pub comparison: MessageComparison,
    pub containment: ContainmentCheck,
    pub pattern: ContentPattern,
}

/// Containment of one span's messages in the final span of its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainmentEntry {
    pub span_id: String,
    pub target_span_id: String,
    pub check: ContainmentCheck,
}
