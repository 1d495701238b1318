use spanweave_types::{DatasetSummary, KeySource, Session, short_id, truncate};

use super::format_duration;
use super::style::{dim, heading};

pub fn print_session_list(title: &str, sessions: &[Session<'_>], limit: Option<usize>) {
    println!("{}", heading(&format!("=== {} ===", title)));
    println!("Found {} sessions", sessions.len());

    let shown = limit.unwrap_or(sessions.len()).min(sessions.len());
    for session in &sessions[..shown] {
        println!();
        print_session(session);
    }

    if shown < sessions.len() {
        println!();
        println!("{}", dim(&format!("... and {} more sessions", sessions.len() - shown)));
    }
    println!();
}

pub fn print_session(session: &Session<'_>) {
    let source = match session.key_source {
        KeySource::Metadata => "session id",
        KeySource::Trace => "trace",
        KeySource::TimeWindow => "time window",
    };
    let segment = session
        .segment
        .map(|n| format!(" (segment {})", n))
        .unwrap_or_default();

    println!(
        "Session {}: {}{} {}",
        session.session_number,
        session.session_id,
        segment,
        dim(&format!("[{}]", source))
    );

    let stats = &session.stats;
    println!(
        "  Spans: {}  Traces: {}  Duration: {}",
        stats.span_count,
        stats.unique_traces,
        format_duration(stats.duration_seconds)
    );
    if let (Some(first), Some(last)) = (
        session.spans.iter().find_map(|s| s.start_time),
        session.spans.iter().filter_map(|s| s.end_time).max(),
    ) {
        println!(
            "  Time: {} to {}",
            first.format("%Y-%m-%d %H:%M:%S"),
            last.format("%Y-%m-%d %H:%M:%S")
        );
    }

    let kinds: Vec<String> = DatasetSummary::ranked(&stats.kinds, usize::MAX)
        .into_iter()
        .map(|(kind, count)| format!("{} {}", kind, count))
        .collect();
    println!("  Kinds: {}", kinds.join(", "));

    if !session.forest.demoted.is_empty() {
        println!(
            "  {}",
            dim(&format!(
                "{} span(s) promoted to root to break parent cycles",
                session.forest.demoted.len()
            ))
        );
    }

    println!("  Tree:");
    for (depth, span) in session.walk() {
        let label = if span.name.is_empty() { "(unnamed)" } else { span.name.as_str() };
        println!(
            "  {}└─ {} [{}] {}",
            "   ".repeat(depth),
            truncate(label, 60),
            span.kind,
            dim(short_id(&span.span_id, 8))
        );
    }
}
