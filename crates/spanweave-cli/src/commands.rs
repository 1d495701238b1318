use anyhow::Result;

use super::args::{Cli, Commands};
use super::handlers;
use crate::context::ExecutionContext;

pub fn run(cli: Cli) -> Result<()> {
    let ctx = ExecutionContext::from_cli(&cli)?;

    match cli.command {
        Commands::Reconstruct {
            input,
            method,
            gap_threshold,
            trace_limit,
            segment,
        } => handlers::reconstruct::handle(
            &ctx,
            &input,
            handlers::reconstruct::Options {
                method,
                gap_threshold,
                trace_limit,
                segment,
            },
        ),

        Commands::Compare {
            input,
            session,
            detailed,
        } => handlers::compare::handle(&ctx, &input, session, detailed),

        Commands::Analyze { input } => handlers::analyze::handle(&ctx, &input),

        Commands::Query {
            input,
            search,
            session_id,
            export,
        } => handlers::query::handle(&ctx, &input, search, session_id, export.as_deref()),

        Commands::Export {
            input,
            output,
            export_format,
            gap_threshold,
        } => handlers::export::handle(&ctx, &input, &output, export_format, gap_threshold),
    }
}
