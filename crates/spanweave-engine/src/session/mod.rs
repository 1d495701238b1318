mod assembler;
mod filter;
mod stats;
mod summary;

pub use assembler::{AssembleOptions, SessionAssembler};
pub use filter::{SpanFilter, filter_spans};
pub use stats::{calculate_session_stats, growth_factor};
pub use summary::summarize_dataset;
