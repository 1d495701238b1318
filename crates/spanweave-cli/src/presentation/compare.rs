use spanweave_types::{ContentPattern, Session, SpanComparison, short_id, truncate};

use super::format_duration;
use super::style::{bad, dim, good, heading, warn};

const MESSAGE_PREVIEW: usize = 100;
const MESSAGE_LIMIT: usize = 3;

pub fn print_session_analysis(session: &Session<'_>, detailed: bool) {
    println!(
        "{}",
        heading(&format!(
            "=== Session {}: {} ===",
            session.session_number, session.session_id
        ))
    );

    let stats = &session.stats;
    println!("  Spans: {}", stats.span_count);
    println!("  Unique traces: {}", stats.unique_traces);
    println!("  Duration: {}", format_duration(stats.duration_seconds));
    println!("  Input messages: {}", stats.total_input_messages);
    if let Some(growth) = stats.growth_factor {
        println!("  Growth factor: {:.2}x", growth);
    }

    if let Some(last) = session.spans.last() {
        println!();
        println!("  Containment in last span ({}):", short_id(&last.span_id, 8));
        if session.containment.is_empty() {
            println!("    {}", dim("no list-form input messages to compare"));
        }
        for entry in &session.containment {
            let check = &entry.check;
            let status = if check.is_complete_subset {
                good("contained")
            } else {
                bad("missing")
            };
            println!(
                "    {}  {}/{} ({:.1}%)  {}",
                short_id(&entry.span_id, 8),
                check.contained_count,
                check.total_earlier,
                check.containment_percentage,
                status
            );
            if detailed {
                print_messages("missing", &check.missing_messages);
            }
        }
    }

    println!();
    println!("  Adjacent turns:");
    if session.comparisons.is_empty() {
        println!("    {}", dim("no comparable turn pairs"));
    }
    for comparison in &session.comparisons {
        print_comparison(comparison, detailed);
    }
    println!();
}

fn print_comparison(comparison: &SpanComparison, detailed: bool) {
    let diff = &comparison.comparison;
    println!(
        "    {} → {}  prev {}  cur {}  dup {}  new {}  overlap {:.1}%  {}",
        short_id(&comparison.earlier_span_id, 8),
        short_id(&comparison.later_span_id, 8),
        diff.total_previous,
        diff.total_current,
        diff.duplicated_count,
        diff.new_count,
        diff.overlap_percentage,
        pattern_label(comparison.pattern)
    );
    if detailed {
        print_messages("new", &diff.new_messages);
        print_messages("missing", &comparison.containment.missing_messages);
    }
}

fn pattern_label(pattern: ContentPattern) -> String {
    match pattern {
        ContentPattern::Accumulation => good("accumulation"),
        ContentPattern::Duplication => warn("duplication"),
        ContentPattern::Loss => bad("loss"),
        ContentPattern::Disjoint => dim("disjoint"),
    }
}

fn print_messages(label: &str, messages: &[String]) {
    for message in messages.iter().take(MESSAGE_LIMIT) {
        println!("      {} {}", dim(label), truncate(message, MESSAGE_PREVIEW));
    }
    if messages.len() > MESSAGE_LIMIT {
        println!(
            "      {}",
            dim(&format!("... {} more {}", messages.len() - MESSAGE_LIMIT, label))
        );
    }
}
