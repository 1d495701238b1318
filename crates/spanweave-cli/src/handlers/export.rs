use anyhow::Result;
use serde_json::json;
use spanweave_engine::assemble_sessions;
use std::path::Path;

use crate::context::ExecutionContext;
use crate::export::write_sessions_to_path;
use crate::presentation::print_json;
use crate::types::ExportFormat;

pub fn handle(
    ctx: &ExecutionContext,
    input: &Path,
    output: &Path,
    format: ExportFormat,
    gap_threshold: Option<u64>,
) -> Result<()> {
    let spans = ctx.load_spans(input)?;
    let options = ctx.assemble_options(gap_threshold.is_some(), gap_threshold);
    let sessions = assemble_sessions(&spans, &options);

    write_sessions_to_path(&sessions, format, output)?;

    if ctx.is_json() {
        print_json(&json!({
            "output": output.display().to_string(),
            "format": format.to_string(),
            "sessions": sessions.len(),
            "spans": spans.len(),
        }))
    } else {
        println!(
            "Exported {} sessions ({} spans) to {}",
            sessions.len(),
            spans.len(),
            output.display()
        );
        Ok(())
    }
}
