pub mod io;
mod mapper;
mod schema;

use spanweave_types::Span;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::Result;
use crate::traits::{ParseMode, ParsedFile, ProbeResult, SpanSource};

pub use self::io::{
    parse_line, parse_openinference_bytes, parse_openinference_text, read_openinference_file,
};

/// Arize Phoenix / OpenInference span exports.
pub struct OpenInferenceSource;

impl SpanSource for OpenInferenceSource {
    fn id(&self) -> &'static str {
        "openinference"
    }

    fn probe(&self, path: &Path) -> ProbeResult {
        if !path.is_file() {
            return ProbeResult::NoMatch;
        }

        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "jsonl" | "ndjson" | "json"));
        if !supported {
            return ProbeResult::NoMatch;
        }

        match first_line(path) {
            Some(line) if line.contains("span_id") => ProbeResult::match_high(),
            Some(_) => ProbeResult::match_low(),
            None => ProbeResult::NoMatch,
        }
    }

    fn parse_file(&self, path: &Path, mode: ParseMode) -> Result<ParsedFile> {
        read_openinference_file(path, mode)
    }

    fn parse_record(&self, content: &str) -> Result<Option<Span>> {
        parse_line(content).map_err(|message| crate::Error::Parse { line: 1, message })
    }
}

fn first_line(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    BufReader::new(file)
        .split(b'\n')
        .take(20)
        .map_while(|line| line.ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .find(|line| !line.trim().is_empty())
}
