/// Truncate a string to a maximum number of characters
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>() + "..."
    }
}

/// Leading characters of an opaque identifier, for display
pub fn short_id(id: &str, len: usize) -> &str {
    match id.char_indices().nth(len) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
