// Engine - session reconstruction over flat span batches.
// Pure transformations: the caller parses input and the engine never performs I/O.

pub mod diff;
pub mod grouping;
pub mod resolver;
pub mod segment;
pub mod session;
pub mod tree;

pub use diff::{Canonicalizer, check_complete_containment, classify, compare_messages};
pub use grouping::{TraceGroup, group_by_trace};
pub use resolver::{SESSION_MARKER, SessionIdResolver, Strategy, extract_session_id};
pub use segment::{DEFAULT_GAP_THRESHOLD_SECS, Segment, segment_by_gap};
pub use session::{
    AssembleOptions, SessionAssembler, SpanFilter, calculate_session_stats, filter_spans,
    growth_factor,
};
pub use tree::build_forest;

use chrono::Duration;
use spanweave_types::{DatasetSummary, Session, Span};

// Façade API - stable entry points for the CLI layer

/// Group spans into sessions by resolved session id, falling back to trace id.
pub fn assemble_sessions<'a>(spans: &'a [Span], options: &AssembleOptions) -> Vec<Session<'a>> {
    SessionAssembler::new(options.clone()).assemble(spans)
}

/// One session per trace id.
pub fn reconstruct_by_trace<'a>(spans: &'a [Span], options: &AssembleOptions) -> Vec<Session<'a>> {
    SessionAssembler::new(options.clone()).assemble_by_trace(spans)
}

/// Sessions cut from the whole batch at idle gaps above `threshold`.
pub fn reconstruct_by_time_windows<'a>(
    spans: &'a [Span],
    threshold: Duration,
    options: &AssembleOptions,
) -> Vec<Session<'a>> {
    SessionAssembler::new(options.clone()).assemble_by_time_windows(spans, threshold)
}

pub fn summarize_dataset(spans: &[Span]) -> DatasetSummary {
    session::summarize_dataset(spans, &SessionIdResolver::default())
}
