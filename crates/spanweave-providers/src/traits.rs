use spanweave_types::Span;
use std::path::Path;

use crate::Result;

/// A span export format.
///
/// Responsibilities:
/// - Recognize files in its format
/// - Turn whole files or single records into spans
pub trait SpanSource: Send + Sync {
    /// Unique source ID (e.g., "openinference")
    fn id(&self) -> &'static str;

    /// Check if a file is in this source's format
    fn probe(&self, path: &Path) -> ProbeResult;

    /// Parse an entire export
    fn parse_file(&self, path: &Path, mode: ParseMode) -> Result<ParsedFile>;

    /// Parse one record. Blank input yields `None`.
    fn parse_record(&self, content: &str) -> Result<Option<Span>>;
}

// --- Helper types ---

/// How malformed records are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// The first malformed record fails the whole read.
    Strict,
    /// Malformed records are logged, counted and skipped.
    #[default]
    Lenient,
}

/// Spans read from one file plus what was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub spans: Vec<Span>,
    pub report: ParseReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Non-blank records seen.
    pub records: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ParseReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based line for NDJSON, 1-based element for JSON arrays.
    pub line: usize,
    pub message: String,
}

/// Probe result with confidence score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeResult {
    /// Source can handle this file with given confidence (0.0 - 1.0)
    Confidence(f32),
    /// Source cannot handle this file
    NoMatch,
}

impl ProbeResult {
    pub fn match_high() -> Self {
        ProbeResult::Confidence(1.0)
    }

    pub fn match_low() -> Self {
        ProbeResult::Confidence(0.3)
    }

    /// Check if this is a match (confidence > 0)
    pub fn is_match(&self) -> bool {
        matches!(self, ProbeResult::Confidence(c) if *c > 0.0)
    }

    /// Get confidence score (0.0 if NoMatch)
    pub fn confidence(&self) -> f32 {
        match self {
            ProbeResult::Confidence(c) => *c,
            ProbeResult::NoMatch => 0.0,
        }
    }
}
