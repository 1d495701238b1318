use anyhow::Result;
use spanweave_engine::summarize_dataset;
use std::path::Path;

use crate::context::ExecutionContext;
use crate::presentation::{print_json, summary::print_dataset_summary};

pub fn handle(ctx: &ExecutionContext, input: &Path) -> Result<()> {
    let spans = ctx.load_spans(input)?;
    let summary = summarize_dataset(&spans);

    if ctx.is_json() {
        print_json(&summary)
    } else {
        print_dataset_summary(&summary);
        Ok(())
    }
}
