use std::collections::HashMap;
use std::hash::Hash;

use spanweave_types::Span;

/// Spans sharing one trace identifier, in input order.
#[derive(Debug, Clone)]
pub struct TraceGroup<'a> {
    pub trace_id: &'a str,
    pub spans: Vec<&'a Span>,
}

/// Partition spans by `key`, keeping input order inside each group and
/// first-appearance order between groups.
pub fn group_by_key<'a, G, K, I>(spans: I, mut key: K) -> Vec<(G, Vec<&'a Span>)>
where
    G: Eq + Hash + Copy,
    I: IntoIterator<Item = &'a Span>,
    K: FnMut(&'a Span) -> G,
{
    let mut positions: HashMap<G, usize> = HashMap::new();
    let mut groups: Vec<(G, Vec<&'a Span>)> = Vec::new();

    for span in spans {
        let k = key(span);
        match positions.get(&k) {
            Some(&idx) => groups[idx].1.push(span),
            None => {
                positions.insert(k, groups.len());
                groups.push((k, vec![span]));
            }
        }
    }

    groups
}

/// Partition spans by trace id; spans without one share the `unknown` group.
pub fn group_by_trace(spans: &[Span]) -> Vec<TraceGroup<'_>> {
    group_by_key(spans, Span::trace_key)
        .into_iter()
        .map(|(trace_id, spans)| TraceGroup { trace_id, spans })
        .collect()
}
