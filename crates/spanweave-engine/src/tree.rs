use std::collections::HashMap;

use spanweave_types::{Span, SpanForest, cmp_start_time};

/// Build a parent/child forest over `spans`.
///
/// A span is a root when its `parent_id` is missing or points outside the set.
/// Children are ordered by start time, ties by input order. Parent chains that
/// loop back on themselves are broken by promoting the earliest cycle member
/// (in input order) to a root; the rest of the cycle stays attached below it.
pub fn build_forest(spans: &[&Span]) -> SpanForest {
    let n = spans.len();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, span) in spans.iter().enumerate() {
        index.entry(span.span_id.as_str()).or_insert(i);
    }

    let mut parent_of: Vec<Option<usize>> = spans
        .iter()
        .map(|s| s.parent_id.as_deref().and_then(|p| index.get(p).copied()))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots = Vec::new();
    for (i, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let mut reached = vec![false; n];
    for &root in &roots {
        mark_reachable(root, &children, &mut reached);
    }

    // Whatever the roots cannot reach hangs off a parent cycle.
    let mut demoted = Vec::new();
    let mut on_path = vec![false; n];
    for start in 0..n {
        if reached[start] {
            continue;
        }

        let mut path = Vec::new();
        let mut current = start;
        while !on_path[current] {
            on_path[current] = true;
            path.push(current);
            match parent_of[current] {
                Some(p) => current = p,
                None => break,
            }
        }

        let cycle_start = path.iter().position(|&node| node == current).unwrap_or(0);
        let head = path[cycle_start..]
            .iter()
            .copied()
            .min()
            .unwrap_or(start);
        for &node in &path {
            on_path[node] = false;
        }

        if let Some(parent) = parent_of[head].take() {
            children[parent].retain(|&c| c != head);
        }
        tracing::debug!(span_id = %spans[head].span_id, "broke parent cycle, promoting to root");
        roots.push(head);
        demoted.push(head);
        mark_reachable(head, &children, &mut reached);
    }

    for list in &mut children {
        list.sort_by(|&a, &b| cmp_start_time(spans[a], spans[b]));
    }
    roots.sort_by(|&a, &b| cmp_start_time(spans[a], spans[b]).then(a.cmp(&b)));

    SpanForest {
        roots,
        children,
        demoted,
    }
}

fn mark_reachable(root: usize, children: &[Vec<usize>], reached: &mut [bool]) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if reached[node] {
            continue;
        }
        reached[node] = true;
        stack.extend(children[node].iter().copied());
    }
}
