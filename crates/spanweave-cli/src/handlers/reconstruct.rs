use anyhow::Result;
use serde_json::{Map, Value};
use spanweave_engine::{assemble_sessions, reconstruct_by_time_windows, reconstruct_by_trace};
use std::path::Path;

use crate::context::ExecutionContext;
use crate::export::session_exports;
use crate::presentation::{print_json, sessions::print_session_list};
use crate::types::Method;

pub struct Options {
    pub method: Method,
    pub gap_threshold: Option<u64>,
    pub trace_limit: Option<usize>,
    pub segment: bool,
}

#[derive(Debug, Clone, Copy)]
enum Grouping {
    Trace,
    Time,
    Session,
}

impl Grouping {
    fn key(self) -> &'static str {
        match self {
            Grouping::Trace => "trace",
            Grouping::Time => "time",
            Grouping::Session => "session",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Grouping::Trace => "TRACE-BASED RECONSTRUCTION",
            Grouping::Time => "TIME-WINDOW RECONSTRUCTION",
            Grouping::Session => "SESSION-ID RECONSTRUCTION",
        }
    }
}

fn groupings(method: Method) -> &'static [Grouping] {
    match method {
        Method::Trace => &[Grouping::Trace],
        Method::Time => &[Grouping::Time],
        Method::Both => &[Grouping::Trace, Grouping::Time],
        Method::Session => &[Grouping::Session],
    }
}

pub fn handle(ctx: &ExecutionContext, input: &Path, options: Options) -> Result<()> {
    let spans = ctx.load_spans(input)?;
    let assemble = ctx.assemble_options(options.segment, options.gap_threshold);
    let window = ctx.gap_threshold(options.gap_threshold);
    let limit = options.trace_limit.unwrap_or(ctx.config.output.trace_limit);

    let mut report = Map::new();
    for &grouping in groupings(options.method) {
        let sessions = match grouping {
            Grouping::Trace => reconstruct_by_trace(&spans, &assemble),
            Grouping::Time => reconstruct_by_time_windows(&spans, window, &assemble),
            Grouping::Session => assemble_sessions(&spans, &assemble),
        };
        tracing::debug!(method = grouping.key(), sessions = sessions.len(), "reconstructed");

        if ctx.is_json() {
            report.insert(
                grouping.key().to_string(),
                serde_json::to_value(session_exports(&sessions))?,
            );
        } else {
            print_session_list(grouping.title(), &sessions, Some(limit));
        }
    }

    if ctx.is_json() {
        print_json(&Value::Object(report))?;
    }
    Ok(())
}
