use spanweave_types::DatasetSummary;

use super::style::heading;

const TOP: usize = 10;

pub fn print_dataset_summary(summary: &DatasetSummary) {
    println!("{}", heading("=== Dataset Summary ==="));
    println!("Total spans: {}", summary.total_spans);
    println!("Unique traces: {}", summary.unique_traces);
    println!("Distinct sessions: {}", summary.distinct_sessions);
    println!(
        "Spans with session id: {} ({:.1}%)",
        summary.with_session_id,
        percent(summary.with_session_id, summary.total_spans)
    );
    println!("Spans without session id: {}", summary.without_session_id);
    println!("Root spans: {}", summary.root_spans);
    println!("Child spans: {}", summary.child_spans);

    print_ranked("Span kinds", &summary.kinds);
    print_ranked("Span names", &summary.names);
    print_ranked("Largest sessions", &summary.sessions);
}

fn print_ranked(title: &str, histogram: &std::collections::BTreeMap<String, usize>) {
    if histogram.is_empty() {
        return;
    }
    println!();
    println!("{}:", title);
    for (key, count) in DatasetSummary::ranked(histogram, TOP) {
        println!("  {:<40} {}", key, count);
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
