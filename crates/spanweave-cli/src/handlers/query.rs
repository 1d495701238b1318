use anyhow::Result;
use spanweave_engine::{SessionIdResolver, SpanFilter, assemble_sessions, filter_spans};
use spanweave_types::Span;
use std::path::Path;

use crate::context::ExecutionContext;
use crate::export::{session_exports, write_sessions_to_path};
use crate::presentation::{print_json, sessions::print_session_list};
use crate::types::ExportFormat;

pub fn handle(
    ctx: &ExecutionContext,
    input: &Path,
    search: Option<String>,
    session_id: Option<String>,
    export: Option<&Path>,
) -> Result<()> {
    let filter = match (search, session_id) {
        (Some(text), _) => SpanFilter::Search(text),
        (None, Some(id)) => SpanFilter::SessionId(id),
        (None, None) => anyhow::bail!("Provide --search or --session-id"),
    };

    let spans = ctx.load_spans(input)?;
    let matched: Vec<Span> = filter_spans(&spans, &filter, &SessionIdResolver::default())
        .into_iter()
        .cloned()
        .collect();
    let sessions = assemble_sessions(&matched, &ctx.assemble_options(false, None));

    if let Some(path) = export {
        write_sessions_to_path(&sessions, ExportFormat::Json, path)?;
        tracing::info!(path = %path.display(), sessions = sessions.len(), "exported query results");
    }

    if ctx.is_json() {
        return print_json(&session_exports(&sessions));
    }

    println!(
        "Found {} matching spans in {} sessions",
        matched.len(),
        sessions.len()
    );
    if !sessions.is_empty() {
        println!();
        print_session_list("QUERY RESULTS", &sessions, None);
    }
    if let Some(path) = export {
        println!("Exported to {}", path.display());
    }
    Ok(())
}
