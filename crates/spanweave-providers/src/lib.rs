// Error types
pub mod error;

// Trait-based architecture (public API)
pub mod traits;

// Source implementations
pub mod openinference;

// Source registry
pub mod registry;

pub use traits::{ParseMode, ParseReport, ParsedFile, ProbeResult, SkippedRecord, SpanSource};

pub use openinference::OpenInferenceSource;

pub use registry::{
    create_all_sources, create_source, detect_source, get_all_sources, get_source_names,
};

pub use error::{Error, Result};

use std::path::Path;

/// Detect the export format of `path` and parse it.
pub fn load_spans(path: &Path, mode: ParseMode) -> Result<ParsedFile> {
    if !path.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        )));
    }
    let source = detect_source(path)?;
    tracing::debug!(source = source.id(), path = %path.display(), "detected span source");
    source.parse_file(path, mode)
}
