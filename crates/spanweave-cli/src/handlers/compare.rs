use anyhow::Result;
use serde::Serialize;
use spanweave_engine::assemble_sessions;
use spanweave_types::{ContainmentEntry, Session, SessionStats, SpanComparison};
use std::path::Path;

use crate::context::ExecutionContext;
use crate::presentation::{compare::print_session_analysis, print_json};

#[derive(Serialize)]
struct SessionAnalysis<'s> {
    session_number: usize,
    session_id: &'s str,
    stats: &'s SessionStats,
    containment: &'s [ContainmentEntry],
    comparisons: &'s [SpanComparison],
}

pub fn handle(
    ctx: &ExecutionContext,
    input: &Path,
    session: Option<usize>,
    detailed: bool,
) -> Result<()> {
    let spans = ctx.load_spans(input)?;
    let sessions = assemble_sessions(&spans, &ctx.assemble_options(false, None));

    let selected: Vec<&Session<'_>> = match session {
        Some(number) => {
            let Some(found) = sessions.iter().find(|s| s.session_number == number) else {
                anyhow::bail!(
                    "Session {} not found ({} sessions reconstructed)",
                    number,
                    sessions.len()
                );
            };
            vec![found]
        }
        None => sessions.iter().filter(|s| s.spans.len() >= 2).collect(),
    };

    if ctx.is_json() {
        let analyses: Vec<SessionAnalysis<'_>> = selected
            .iter()
            .map(|s| SessionAnalysis {
                session_number: s.session_number,
                session_id: &s.session_id,
                stats: &s.stats,
                containment: &s.containment,
                comparisons: &s.comparisons,
            })
            .collect();
        return print_json(&analyses);
    }

    if selected.is_empty() {
        println!("No sessions with two or more spans to compare.");
        return Ok(());
    }
    for session in selected {
        print_session_analysis(session, detailed);
    }
    Ok(())
}
