use anyhow::{Context, Result};
use serde::Serialize;
use spanweave_types::{ContainmentEntry, KeySource, Session, SessionStats, Span, SpanComparison};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::ExportFormat;

/// Session as written by `export` and `--format json`.
#[derive(Debug, Serialize)]
pub struct SessionExport<'s> {
    pub session_number: usize,
    pub session_id: &'s str,
    pub key_source: KeySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<usize>,
    pub stats: &'s SessionStats,
    pub spans: Vec<SpanExport<'s>>,
    pub roots: &'s [&'s str],
    pub tree: &'s BTreeMap<&'s str, Vec<&'s str>>,
    pub comparisons: &'s [SpanComparison],
    pub containment: &'s [ContainmentEntry],
}

#[derive(Debug, Serialize)]
pub struct SpanExport<'s> {
    /// Depth in the session tree, roots at 0.
    pub depth: usize,
    #[serde(flatten)]
    pub span: &'s Span,
}

impl<'s> SessionExport<'s> {
    pub fn new(session: &'s Session<'_>) -> Self {
        let depths = session.forest.depths();
        let spans = session
            .spans
            .iter()
            .enumerate()
            .map(|(i, &span)| SpanExport {
                depth: depths.get(i).copied().unwrap_or(0),
                span,
            })
            .collect();

        Self {
            session_number: session.session_number,
            session_id: &session.session_id,
            key_source: session.key_source,
            segment: session.segment,
            stats: &session.stats,
            spans,
            roots: &session.roots,
            tree: &session.tree,
            comparisons: &session.comparisons,
            containment: &session.containment,
        }
    }
}

pub fn session_exports<'s>(sessions: &'s [Session<'_>]) -> Vec<SessionExport<'s>> {
    sessions.iter().map(SessionExport::new).collect()
}

/// One CSV row per span.
#[derive(Debug, Serialize)]
struct CsvRow<'s> {
    session_number: usize,
    session_id: &'s str,
    segment: Option<usize>,
    span_id: &'s str,
    trace_id: Option<&'s str>,
    parent_id: Option<&'s str>,
    name: &'s str,
    kind: &'s str,
    start_time: Option<String>,
    end_time: Option<String>,
    depth: usize,
}

pub fn write_sessions<W: Write>(sessions: &[Session<'_>], format: ExportFormat, mut out: W) -> Result<()> {
    let exports = session_exports(sessions);
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &exports)?;
            writeln!(out)?;
        }
        ExportFormat::Jsonl => {
            for export in &exports {
                serde_json::to_writer(&mut out, export)?;
                writeln!(out)?;
            }
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            for export in &exports {
                for row in &export.spans {
                    let span = row.span;
                    writer.serialize(CsvRow {
                        session_number: export.session_number,
                        session_id: export.session_id,
                        segment: export.segment,
                        span_id: &span.span_id,
                        trace_id: span.trace_id.as_deref(),
                        parent_id: span.parent_id.as_deref(),
                        name: &span.name,
                        kind: &span.kind,
                        start_time: span.start_time.map(|t| t.to_rfc3339()),
                        end_time: span.end_time.map(|t| t.to_rfc3339()),
                        depth: row.depth,
                    })?;
                }
            }
            writer.flush()?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn write_sessions_to_path(sessions: &[Session<'_>], format: ExportFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_sessions(sessions, format, BufWriter::new(file))
}
