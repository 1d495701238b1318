use chrono::{DateTime, Duration, Utc};
use spanweave_types::Span;

/// Default inactivity gap between conversations.
pub const DEFAULT_GAP_THRESHOLD_SECS: i64 = 300;

/// Contiguous run of spans with no idle gap above the threshold.
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    /// 1-based, in discovery order.
    pub number: usize,
    pub spans: Vec<&'a Span>,
}

/// Split a start-time-ordered sequence wherever the idle time between one
/// span's end and the next span's start exceeds `threshold`.
///
/// A missing start on the current span, or a missing end on the previous one,
/// counts as no gap.
pub fn segment_by_gap<'a>(spans: &[&'a Span], threshold: Duration) -> Vec<Segment<'a>> {
    let mut segments: Vec<Segment<'a>> = Vec::new();
    let mut current: Vec<&'a Span> = Vec::new();
    let mut last_end: Option<DateTime<Utc>> = None;

    for &span in spans {
        if !current.is_empty() && exceeds(last_end, span.start_time, threshold) {
            segments.push(Segment {
                number: segments.len() + 1,
                spans: std::mem::take(&mut current),
            });
        }
        current.push(span);
        last_end = span.end_time;
    }

    if !current.is_empty() {
        segments.push(Segment {
            number: segments.len() + 1,
            spans: current,
        });
    }

    tracing::trace!(segments = segments.len(), "segmented span sequence");
    segments
}

fn exceeds(last_end: Option<DateTime<Utc>>, start: Option<DateTime<Utc>>, threshold: Duration) -> bool {
    match (last_end, start) {
        (Some(end), Some(start)) => start - end > threshold,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap()
    }

    /// Spans of `len` seconds, each starting `gap` seconds after the previous end.
    fn chain(n: usize, len: i64, gap: i64) -> Vec<Span> {
        let mut spans = Vec::with_capacity(n);
        let mut cursor = base();
        for i in 0..n {
            let mut s = Span::new(format!("s{i}"));
            s.start_time = Some(cursor);
            s.end_time = Some(cursor + Duration::seconds(len));
            cursor = cursor + Duration::seconds(len + gap);
            spans.push(s);
        }
        spans
    }

    fn sizes(segments: &[Segment<'_>]) -> Vec<usize> {
        segments.iter().map(|s| s.spans.len()).collect()
    }

    #[test]
    fn test_gap_above_threshold_splits_every_span() {
        let owned = chain(6, 10, 301);
        let spans: Vec<&Span> = owned.iter().collect();

        let segments = segment_by_gap(&spans, Duration::seconds(300));
        assert_eq!(sizes(&segments), vec![1; 6]);
        let numbers: Vec<usize> = segments.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_small_gaps_form_one_segment() {
        let owned = chain(6, 10, 1);
        let spans: Vec<&Span> = owned.iter().collect();

        let segments = segment_by_gap(&spans, Duration::seconds(300));
        assert_eq!(sizes(&segments), vec![6]);
    }

    #[test]
    fn test_gap_equal_to_threshold_does_not_split() {
        let owned = chain(3, 5, 300);
        let spans: Vec<&Span> = owned.iter().collect();

        let segments = segment_by_gap(&spans, Duration::seconds(300));
        assert_eq!(sizes(&segments), vec![3]);
    }

    #[test]
    fn test_missing_timestamps_fold_into_current() {
        let mut owned = chain(4, 10, 1000);
        // s0|s1 has no start and s2|s3 has no end to measure from; only s1|s2 splits.
        owned[1].start_time = None;
        owned[2].end_time = None;
        let spans: Vec<&Span> = owned.iter().collect();

        let segments = segment_by_gap(&spans, Duration::seconds(300));
        assert_eq!(sizes(&segments), vec![2, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(segment_by_gap(&[], Duration::seconds(300)).is_empty());
    }
}
