use std::collections::BTreeMap;

use chrono::Duration;
use spanweave_types::{
    ContainmentEntry, KeySource, Session, Span, SpanComparison, SpanForest, cmp_start_time,
};

use super::stats::calculate_session_stats;
use crate::diff::{Canonicalizer, classify};
use crate::grouping::group_by_key;
use crate::resolver::SessionIdResolver;
use crate::segment::segment_by_gap;
use crate::tree::build_forest;

/// Knobs for one assembly run.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Split sessions at idle gaps above this. Off when `None`.
    pub gap_threshold: Option<Duration>,
    pub canonicalizer: Canonicalizer,
}

/// Reconstructs sessions from a flat span batch.
///
/// Every group moves through the same sequence of stages:
/// `Collecting` → `Segmenting` → `Treed` → `Analyzed` → `Final`. Each stage is
/// its own type and consumes the previous one, so a group can never skip or
/// revisit a stage. Only the final [`Session`] leaves the assembler.
#[derive(Default)]
pub struct SessionAssembler {
    resolver: SessionIdResolver,
    options: AssembleOptions,
}

impl SessionAssembler {
    pub fn new(options: AssembleOptions) -> Self {
        Self {
            resolver: SessionIdResolver::default(),
            options,
        }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    pub fn resolver(&self) -> &SessionIdResolver {
        &self.resolver
    }

    /// Group by resolved session id, falling back to the trace id.
    ///
    /// Metadata ids and trace ids are separate namespaces: a trace `abc` never
    /// merges with a session resolved to `abc`.
    pub fn assemble<'a>(&self, spans: &'a [Span]) -> Vec<Session<'a>> {
        let groups = group_by_key(spans, |span| match self.resolver.session_key(span) {
            (id, true) => (KeySource::Metadata, id),
            (id, false) => (KeySource::Trace, id),
        });
        let collected = groups.into_iter().map(|((key_source, key), members)| {
            Collecting::new(key.to_string(), key_source, members)
        });
        self.run(collected, self.options.gap_threshold)
    }

    /// One session per trace id, ignoring session metadata.
    pub fn assemble_by_trace<'a>(&self, spans: &'a [Span]) -> Vec<Session<'a>> {
        let collected = group_by_key(spans, Span::trace_key)
            .into_iter()
            .map(|(key, members)| Collecting::new(key.to_string(), KeySource::Trace, members));
        self.run(collected, self.options.gap_threshold)
    }

    /// Sort the whole batch by start time and cut it at idle gaps.
    ///
    /// Sessions are keyed `window-<n>` in discovery order.
    pub fn assemble_by_time_windows<'a>(
        &self,
        spans: &'a [Span],
        threshold: Duration,
    ) -> Vec<Session<'a>> {
        let mut ordered: Vec<&'a Span> = spans.iter().collect();
        ordered.sort_by(|a, b| cmp_start_time(a, b));

        let collected = segment_by_gap(&ordered, threshold)
            .into_iter()
            .map(|segment| {
                Collecting::new(
                    format!("window-{}", segment.number),
                    KeySource::TimeWindow,
                    segment.spans,
                )
            });
        self.run(collected, None)
    }

    fn run<'a, I>(&self, collected: I, threshold: Option<Duration>) -> Vec<Session<'a>>
    where
        I: Iterator<Item = Collecting<'a>>,
    {
        let mut sessions = Vec::new();
        for group in collected {
            for segment in group.segment(threshold) {
                let number = sessions.len() + 1;
                let session = segment
                    .build_tree()
                    .analyze(&self.options.canonicalizer)
                    .finish(number, &self.resolver);
                sessions.push(session);
            }
        }
        tracing::debug!(sessions = sessions.len(), "assembled sessions");
        sessions
    }
}

/// Spans gathered under one key, not yet ordered.
struct Collecting<'a> {
    key: String,
    key_source: KeySource,
    spans: Vec<&'a Span>,
}

/// Chronologically ordered spans of one (sub-)session.
struct Segmenting<'a> {
    key: String,
    key_source: KeySource,
    segment: Option<usize>,
    spans: Vec<&'a Span>,
}

struct Treed<'a> {
    inner: Segmenting<'a>,
    forest: SpanForest,
}

struct Analyzed<'a> {
    treed: Treed<'a>,
    comparisons: Vec<SpanComparison>,
    containment: Vec<ContainmentEntry>,
}

impl<'a> Collecting<'a> {
    fn new(key: String, key_source: KeySource, spans: Vec<&'a Span>) -> Self {
        Self {
            key,
            key_source,
            spans,
        }
    }

    fn segment(mut self, threshold: Option<Duration>) -> Vec<Segmenting<'a>> {
        self.spans.sort_by(|a, b| cmp_start_time(a, b));

        let Some(threshold) = threshold else {
            return vec![Segmenting {
                key: self.key,
                key_source: self.key_source,
                segment: None,
                spans: self.spans,
            }];
        };

        let segments = segment_by_gap(&self.spans, threshold);
        if segments.len() > 1 {
            tracing::debug!(key = %self.key, segments = segments.len(), "split session at idle gaps");
        }
        segments
            .into_iter()
            .map(|segment| Segmenting {
                key: self.key.clone(),
                key_source: self.key_source,
                segment: Some(segment.number),
                spans: segment.spans,
            })
            .collect()
    }
}

impl<'a> Segmenting<'a> {
    fn build_tree(self) -> Treed<'a> {
        let forest = build_forest(&self.spans);
        Treed {
            inner: self,
            forest,
        }
    }
}

impl<'a> Treed<'a> {
    fn analyze(self, canonicalizer: &Canonicalizer) -> Analyzed<'a> {
        let spans = &self.inner.spans;

        let comparisons = spans
            .windows(2)
            .filter_map(|pair| {
                let earlier = pair[0].input_message_list()?;
                let later = pair[1].input_message_list()?;
                let comparison = canonicalizer.compare_messages(earlier, later);
                let containment = canonicalizer.check_complete_containment(earlier, later);
                let pattern = classify(&containment, &comparison);
                Some(SpanComparison {
                    earlier_span_id: pair[0].span_id.clone(),
                    later_span_id: pair[1].span_id.clone(),
                    comparison,
                    containment,
                    pattern,
                })
            })
            .collect();

        let containment = match spans.split_last() {
            Some((last, earlier)) if !earlier.is_empty() => match last.input_message_list() {
                Some(target) => earlier
                    .iter()
                    .filter_map(|span| {
                        let messages = span.input_message_list()?;
                        Some(ContainmentEntry {
                            span_id: span.span_id.clone(),
                            target_span_id: last.span_id.clone(),
                            check: canonicalizer.check_complete_containment(messages, target),
                        })
                    })
                    .collect(),
                None => Vec::new(),
            },
            _ => Vec::new(),
        };

        Analyzed {
            treed: self,
            comparisons,
            containment,
        }
    }
}

impl<'a> Analyzed<'a> {
    fn finish(self, session_number: usize, resolver: &SessionIdResolver) -> Session<'a> {
        let Analyzed {
            treed: Treed { inner, forest },
            comparisons,
            containment,
        } = self;
        let spans = inner.spans;

        let id_of = |i: usize| -> &'a str {
            let span: &'a Span = spans[i];
            span.span_id.as_str()
        };

        let roots: Vec<&'a str> = forest.roots.iter().map(|&i| id_of(i)).collect();

        let mut tree: BTreeMap<&'a str, Vec<&'a str>> = BTreeMap::new();
        for (parent, children) in forest.children.iter().enumerate() {
            if children.is_empty() {
                continue;
            }
            // Duplicate span ids share one entry.
            tree.entry(id_of(parent))
                .or_default()
                .extend(children.iter().map(|&c| id_of(c)));
        }

        let stats = calculate_session_stats(&spans, resolver);

        Session {
            session_number,
            session_id: inner.key,
            key_source: inner.key_source,
            segment: inner.segment,
            spans,
            roots,
            tree,
            forest,
            stats,
            comparisons,
            containment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use spanweave_types::MessagePayload;

    fn span(id: &str, trace: &str, offset: i64) -> Span {
        let base = Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap();
        let mut s = Span::new(id);
        s.trace_id = Some(trace.to_string());
        s.start_time = Some(base + Duration::seconds(offset));
        s.end_time = Some(base + Duration::seconds(offset + 1));
        s
    }

    fn windowed() -> AssembleOptions {
        AssembleOptions {
            gap_threshold: Some(Duration::seconds(300)),
            ..AssembleOptions::default()
        }
    }

    #[test]
    fn test_metadata_key_merges_traces() {
        let mut a = span("a", "T1", 0);
        a.metadata = Some(json!({"user_id": "user_session_s1"}));
        let mut b = span("b", "T2", 10);
        b.metadata = Some(json!({"user_api_key_end_user_id": "x_session_s1"}));
        let c = span("c", "T3", 20);
        let spans = vec![a, b, c];

        let sessions = SessionAssembler::default().assemble(&spans);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "s1");
        assert_eq!(sessions[0].key_source, KeySource::Metadata);
        assert_eq!(sessions[0].stats.unique_traces, 2);
        assert_eq!(sessions[0].stats.spans_with_session_id, 2);
        assert_eq!(sessions[1].session_id, "T3");
        assert_eq!(sessions[1].key_source, KeySource::Trace);
        assert_eq!(sessions[1].session_number, 2);
    }

    #[test]
    fn test_trace_key_never_merges_with_equal_session_id() {
        let untagged = span("a", "abc", 0);
        let mut tagged = span("b", "zzz", 5);
        tagged.metadata = Some(json!({"user_id": "u_session_abc"}));
        let spans = vec![untagged, tagged];

        let sessions = SessionAssembler::default().assemble(&spans);
        let shape: Vec<(&str, KeySource, usize)> = sessions
            .iter()
            .map(|s| (s.session_id.as_str(), s.key_source, s.stats.spans_with_session_id))
            .collect();
        assert_eq!(
            shape,
            vec![("abc", KeySource::Trace, 0), ("abc", KeySource::Metadata, 1)]
        );
    }

    #[test]
    fn test_duplicate_span_ids_keep_children() {
        let first = span("p", "T1", 0);
        let duplicate = span("p", "T1", 1);
        let mut child = span("c", "T1", 2);
        child.parent_id = Some("p".to_string());
        let spans = vec![first, duplicate, child];

        let sessions = SessionAssembler::default().assemble(&spans);
        let session = &sessions[0];
        assert_eq!(session.spans.len(), 3);
        assert_eq!(session.children_of("p"), ["c"]);
        assert_eq!(session.roots, vec!["p", "p"]);
    }

    #[test]
    fn test_spans_sorted_with_missing_start_last() {
        let mut undated = span("undated", "T1", 0);
        undated.start_time = None;
        let spans = vec![undated, span("second", "T1", 20), span("first", "T1", 5)];

        let sessions = SessionAssembler::default().assemble(&spans);
        let order: Vec<&str> = sessions[0].spans.iter().map(|s| s.span_id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "undated"]);
    }

    #[test]
    fn test_segmentation_is_opt_in() {
        let spans = vec![span("a", "T1", 0), span("b", "T1", 1000), span("c", "T1", 1005)];

        let unsplit = SessionAssembler::default().assemble(&spans);
        assert_eq!(unsplit.len(), 1);
        assert_eq!(unsplit[0].segment, None);

        let split = SessionAssembler::new(windowed()).assemble(&spans);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].segment, Some(1));
        assert_eq!(split[1].segment, Some(2));
        assert_eq!(split[1].session_id, "T1");
        assert_eq!(split[1].stats.span_count, 2);
    }

    #[test]
    fn test_segment_tree_only_spans_members() {
        let root = span("root", "T1", 0);
        let mut child = span("child", "T1", 1000);
        child.parent_id = Some("root".to_string());
        let spans = vec![root, child];

        let split = SessionAssembler::new(windowed()).assemble(&spans);
        assert_eq!(split.len(), 2);
        assert_eq!(split[1].roots, vec!["child"]);
        assert!(split[0].tree.is_empty());
    }

    #[test]
    fn test_adjacent_comparisons_and_final_containment() {
        let turn = |id: &str, offset: i64, messages: Vec<serde_json::Value>| {
            let mut s = span(id, "T1", offset);
            s.input_messages = Some(MessagePayload::List(messages));
            s
        };
        let m1 = json!({"role": "user", "content": "one"});
        let m2 = json!({"role": "assistant", "content": "two"});
        let m3 = json!({"role": "user", "content": "three"});

        let mut raw = span("raw", "T1", 5);
        raw.input_messages = Some(MessagePayload::Raw(json!("opaque")));

        let spans = vec![
            turn("t1", 0, vec![m1.clone()]),
            turn("t2", 10, vec![m1.clone(), m2.clone(), m3.clone()]),
            raw,
            turn("t3", 20, vec![m2.clone(), m3.clone()]),
        ];

        let sessions = SessionAssembler::default().assemble(&spans);
        let session = &sessions[0];

        // t1 → raw and raw → t2 are skipped: raw payloads do not compare.
        let pairs: Vec<(&str, &str)> = session
            .comparisons
            .iter()
            .map(|c| (c.earlier_span_id.as_str(), c.later_span_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("t2", "t3")]);

        let loss = session.comparison("t2", "t3").expect("t2 → t3 comparison");
        assert_eq!(loss.pattern, spanweave_types::ContentPattern::Loss);
        assert_eq!(loss.containment.missing_count, 1);

        let targets: Vec<(&str, bool)> = session
            .containment
            .iter()
            .map(|c| (c.span_id.as_str(), c.check.is_complete_subset))
            .collect();
        assert_eq!(targets, vec![("t1", false), ("t2", false)]);
        assert_eq!(session.stats.growth_factor, Some(2.0));
    }

    #[test]
    fn test_time_windows_span_traces() {
        let spans = vec![
            span("a", "T1", 0),
            span("b", "T2", 10),
            span("c", "T1", 2000),
        ];

        let sessions =
            SessionAssembler::default().assemble_by_time_windows(&spans, Duration::seconds(300));
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "window-1");
        assert_eq!(sessions[0].key_source, KeySource::TimeWindow);
        assert_eq!(sessions[0].stats.unique_traces, 2);
        assert_eq!(sessions[1].session_id, "window-2");
    }

    #[test]
    fn test_by_trace_ignores_metadata() {
        let mut a = span("a", "T1", 0);
        a.metadata = Some(json!({"user_id": "u_session_s1"}));
        let mut b = span("b", "T2", 1);
        b.metadata = Some(json!({"user_id": "u_session_s1"}));
        let spans = vec![a, b];

        let sessions = SessionAssembler::default().assemble_by_trace(&spans);
        let ids: Vec<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
    }
}
