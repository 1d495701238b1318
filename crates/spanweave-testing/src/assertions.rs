//! Custom assertions for spanweave-specific validation.

use anyhow::{Context, Result};
use serde_json::Value;
use spanweave_types::{Session, SpanForest};

/// Every index in `0..len` appears exactly once, as a root or as one child.
pub fn assert_forest_covers(forest: &SpanForest, len: usize) -> Result<()> {
    let mut seen = vec![0usize; len];
    for &index in forest.roots.iter().chain(forest.children.iter().flatten()) {
        let slot = seen
            .get_mut(index)
            .with_context(|| format!("forest references index {} out of {}", index, len))?;
        *slot += 1;
    }

    if let Some((index, count)) = seen.iter().enumerate().find(|(_, c)| **c != 1) {
        anyhow::bail!("span index {} placed {} times in forest", index, count);
    }
    if forest.depth_first().len() != len {
        anyhow::bail!(
            "depth-first walk visited {} of {} spans",
            forest.depth_first().len(),
            len
        );
    }
    Ok(())
}

/// Span ids of a session, in session order.
pub fn span_ids<'a>(session: &Session<'a>) -> Vec<&'a str> {
    session.spans.iter().map(|s| s.span_id.as_str()).collect()
}

/// Assert that JSON output is an array with the expected number of sessions.
pub fn assert_session_count(json: &Value, expected: usize) -> Result<()> {
    let sessions = json
        .as_array()
        .context("Expected a JSON array of sessions")?;

    if sessions.len() != expected {
        anyhow::bail!("Expected {} sessions, got {}", expected, sessions.len());
    }

    Ok(())
}

/// Session ids from JSON output, in output order.
pub fn session_ids(json: &Value) -> Result<Vec<String>> {
    let sessions = json
        .as_array()
        .context("Expected a JSON array of sessions")?;

    sessions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            s["session_id"]
                .as_str()
                .map(String::from)
                .with_context(|| format!("Session {} missing session_id", i))
        })
        .collect()
}
