use serde_json::Value;
use spanweave_types::Span;
use std::path::Path;

use super::mapper::map_record;
use super::schema::ExportRecord;
use crate::traits::{ParseMode, ParsedFile, ParseReport, SkippedRecord};
use crate::{Error, Result};

/// Parse one NDJSON line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> std::result::Result<Option<Span>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    parse_value(value).map(Some)
}

fn parse_value(value: Value) -> std::result::Result<Span, String> {
    match value {
        Value::Object(fields) => map_record(&ExportRecord::new(fields)),
        other => Err(format!("expected a span object, found {}", kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read an OpenInference export: one span per line, or a single JSON array.
///
/// Lines are decoded one at a time, so a line with invalid UTF-8 is a
/// malformed record rather than an unreadable file.
pub fn read_openinference_file(path: &Path, mode: ParseMode) -> Result<ParsedFile> {
    let bytes = std::fs::read(path)?;
    let parsed = parse_openinference_bytes(&bytes, mode)?;
    tracing::debug!(
        path = %path.display(),
        spans = parsed.spans.len(),
        skipped = parsed.report.skipped_count(),
        "read span export"
    );
    Ok(parsed)
}

pub fn parse_openinference_text(text: &str, mode: ParseMode) -> Result<ParsedFile> {
    parse_openinference_bytes(text.as_bytes(), mode)
}

pub fn parse_openinference_bytes(bytes: &[u8], mode: ParseMode) -> Result<ParsedFile> {
    if bytes.trim_ascii_start().starts_with(b"[") {
        let items: Vec<Value> = serde_json::from_slice(bytes)?;
        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, value)| (i + 1, parse_value(value).map(Some)));
        collect(records, mode)
    } else {
        let records = bytes.split(|&b| b == b'\n').enumerate().map(|(i, line)| {
            let outcome = match std::str::from_utf8(line) {
                Ok(line) => parse_line(line),
                Err(e) => Err(format!("invalid UTF-8: {e}")),
            };
            (i + 1, outcome)
        });
        collect(records, mode)
    }
}

fn collect<I>(records: I, mode: ParseMode) -> Result<ParsedFile>
where
    I: Iterator<Item = (usize, std::result::Result<Option<Span>, String>)>,
{
    let mut spans = Vec::new();
    let mut report = ParseReport::default();

    for (line, outcome) in records {
        match outcome {
            Ok(None) => continue,
            Ok(Some(span)) => {
                report.records += 1;
                spans.push(span);
            }
            Err(message) => {
                report.records += 1;
                if mode == ParseMode::Strict {
                    return Err(Error::Parse { line, message });
                }
                tracing::warn!(line, %message, "skipping malformed span record");
                report.skipped.push(SkippedRecord { line, message });
            }
        }
    }

    Ok(ParsedFile { spans, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{"context.span_id": "a", "context.trace_id": "T1"}"#;

    #[test]
    fn test_blank_lines_are_skipped_silently() {
        let text = format!("\n{GOOD}\n   \n");
        let parsed = parse_openinference_text(&text, ParseMode::Strict).unwrap();
        assert_eq!(parsed.spans.len(), 1);
        assert_eq!(parsed.report.records, 1);
    }

    #[test]
    fn test_strict_mode_reports_line() {
        let text = format!("{GOOD}\n{{not json\n");
        match parse_openinference_text(&text, ParseMode::Strict) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_mode_counts_skips() {
        let text = format!("{GOOD}\n{{not json\n42\n{{\"name\": \"no id\"}}\n");
        let parsed = parse_openinference_text(&text, ParseMode::Lenient).unwrap();
        assert_eq!(parsed.spans.len(), 1);
        assert_eq!(parsed.report.records, 4);
        let lines: Vec<usize> = parsed.report.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(parsed.report.skipped[1].message.contains("a number"));
    }

    #[test]
    fn test_invalid_utf8_line_is_one_bad_record() {
        let mut bytes = format!("{GOOD}\n").into_bytes();
        bytes.extend_from_slice(b"{\"span_id\": \"\xff\"}\n");
        bytes.extend_from_slice(br#"{"span_id": "c"}"#);

        let parsed = parse_openinference_bytes(&bytes, ParseMode::Lenient).unwrap();
        let ids: Vec<&str> = parsed.spans.iter().map(|s| s.span_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(parsed.report.skipped[0].line, 2);
        assert!(parsed.report.skipped[0].message.contains("invalid UTF-8"));

        match parse_openinference_bytes(&bytes, ParseMode::Strict) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_array_input() {
        let text = format!("[{GOOD}, {{\"span_id\": \"b\"}}, null]");
        let parsed = parse_openinference_text(&text, ParseMode::Lenient).unwrap();
        let ids: Vec<&str> = parsed.spans.iter().map(|s| s.span_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(parsed.report.skipped[0].line, 3);
    }
}
