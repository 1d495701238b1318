use serde::{Deserialize, Serialize};

/// Parent/child hierarchy over a flat span arena.
///
/// Nodes are indices into the slice the forest was built from. Every index
/// appears exactly once: either in `roots` or in exactly one `children` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanForest {
    pub roots: Vec<usize>,
    pub children: Vec<Vec<usize>>,
    /// Roots that were promoted because their parent chain formed a cycle.
    pub demoted: Vec<usize>,
}

impl SpanForest {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children_of(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pre-order walk yielding `(depth, index)`, roots at depth 0.
    pub fn depth_first(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.len());
        let mut seen = vec![false; self.len()];
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&r| (0, r)).collect();

        while let Some((depth, node)) = stack.pop() {
            if node >= seen.len() || seen[node] {
                continue;
            }
            seen[node] = true;
            out.push((depth, node));
            for &child in self.children_of(node).iter().rev() {
                stack.push((depth + 1, child));
            }
        }

        out
    }

    /// Depth of every node, indexed like the arena.
    pub fn depths(&self) -> Vec<usize> {
        let mut depths = vec![0; self.len()];
        for (depth, node) in self.depth_first() {
            depths[node] = depth;
        }
        depths
    }
}
