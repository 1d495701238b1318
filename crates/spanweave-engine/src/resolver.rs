use serde_json::{Map, Value};
use spanweave_types::Span;

/// Substring that prefixes the session id inside user identifiers.
pub const SESSION_MARKER: &str = "session_";

type ExtractFn = Box<dyn Fn(&Map<String, Value>) -> Option<String>>;

/// One way of pulling a session id out of span metadata.
pub struct Strategy {
    pub name: &'static str,
    extract: ExtractFn,
}

impl Strategy {
    fn new<F>(name: &'static str, extract: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Option<String> + 'static,
    {
        Self {
            name,
            extract: Box::new(extract),
        }
    }

    /// Follow `path` through nested objects and apply the marker rule to the leaf.
    fn key_path(name: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(name, move |metadata| {
            let (last, parents) = path.split_last()?;
            let mut current = metadata;
            for key in parents {
                current = current.get(*key)?.as_object()?;
            }
            after_marker(current.get(*last)?)
        })
    }

    pub fn extract(&self, metadata: &Map<String, Value>) -> Option<String> {
        (self.extract)(metadata)
    }
}

/// The fixed chain of extraction strategies; the first hit wins.
///
/// Resolved ids are cached on each span, so there is exactly one chain. A
/// second chain would read tags written by the first.
pub struct SessionIdResolver {
    strategies: Vec<Strategy>,
}

impl Default for SessionIdResolver {
    fn default() -> Self {
        Self::new(vec![
            Strategy::key_path("user_id", &["user_id"]),
            Strategy::key_path("user_api_key_end_user_id", &["user_api_key_end_user_id"]),
            Strategy::key_path(
                "requester_metadata.user_id",
                &["requester_metadata", "user_id"],
            ),
        ])
    }
}

impl SessionIdResolver {
    fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    /// Resolve a session id from raw metadata.
    ///
    /// Absent, non-object and empty metadata resolve to `None`. A value that
    /// ends with the marker resolves to `Some("")`.
    pub fn resolve(&self, metadata: Option<&Value>) -> Option<String> {
        let map = metadata?.as_object()?;
        if map.is_empty() {
            return None;
        }
        self.strategies.iter().find_map(|s| s.extract(map))
    }

    /// Resolve and cache the session id on the span.
    pub fn resolve_span<'a>(&self, span: &'a Span) -> Option<&'a str> {
        span.session_tag_or_init(|s| self.resolve(s.metadata.as_ref()))
    }

    /// Group key for a span: a non-empty resolved id, else its trace key.
    pub fn session_key<'a>(&self, span: &'a Span) -> (&'a str, bool) {
        match self.resolve_span(span) {
            Some(id) if !id.is_empty() => (id, true),
            _ => (span.trace_key(), false),
        }
    }
}

/// Everything after the last marker occurrence in the value's text form.
fn after_marker(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let idx = text.rfind(SESSION_MARKER)?;
    Some(text[idx + SESSION_MARKER.len()..].to_string())
}

/// Resolve with the default strategy chain.
pub fn extract_session_id(metadata: Option<&Value>) -> Option<String> {
    SessionIdResolver::default().resolve(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_id_suffix() {
        let metadata = json!({"user_id": "abc_session_42"});
        assert_eq!(extract_session_id(Some(&metadata)), Some("42".to_string()));
    }

    #[test]
    fn test_nested_requester_metadata() {
        let metadata = json!({"requester_metadata": {"user_id": "session_X"}});
        assert_eq!(extract_session_id(Some(&metadata)), Some("X".to_string()));
    }

    #[test]
    fn test_absent_and_empty_metadata() {
        assert_eq!(extract_session_id(None), None);
        assert_eq!(extract_session_id(Some(&json!({}))), None);
        assert_eq!(extract_session_id(Some(&json!("session_1"))), None);
        assert_eq!(extract_session_id(Some(&json!([1, 2]))), None);
        assert_eq!(extract_session_id(Some(&Value::Null)), None);
    }

    #[test]
    fn test_precedence_is_fixed() {
        let metadata = json!({
            "requester_metadata": {"user_id": "session_nested"},
            "user_api_key_end_user_id": "user_session_api",
            "user_id": "user_session_direct",
        });
        assert_eq!(
            extract_session_id(Some(&metadata)),
            Some("direct".to_string())
        );

        let metadata = json!({
            "requester_metadata": {"user_id": "session_nested"},
            "user_api_key_end_user_id": "user_session_api",
        });
        assert_eq!(extract_session_id(Some(&metadata)), Some("api".to_string()));
    }

    #[test]
    fn test_falls_through_when_marker_missing() {
        let metadata = json!({
            "user_id": "plain-user",
            "requester_metadata": {"user_id": "session_fallback"},
        });
        assert_eq!(
            extract_session_id(Some(&metadata)),
            Some("fallback".to_string())
        );
    }

    #[test]
    fn test_last_marker_occurrence_wins() {
        let metadata = json!({"user_id": "session_a_session_b"});
        assert_eq!(extract_session_id(Some(&metadata)), Some("b".to_string()));
    }

    #[test]
    fn test_trailing_marker_yields_empty_string() {
        let metadata = json!({"user_id": "user_session_"});
        assert_eq!(extract_session_id(Some(&metadata)), Some(String::new()));
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let metadata = json!({"user_id": {"tag": "session_7"}});
        assert_eq!(
            extract_session_id(Some(&metadata)),
            Some("7\"}".to_string())
        );

        let metadata = json!({"user_id": 12345});
        assert_eq!(extract_session_id(Some(&metadata)), None);
    }

    #[test]
    fn test_requester_metadata_must_be_object() {
        let metadata = json!({"requester_metadata": "session_nope"});
        assert_eq!(extract_session_id(Some(&metadata)), None);
    }

    #[test]
    fn test_strategy_chain_is_fixed() {
        assert_eq!(
            SessionIdResolver::default().strategy_names(),
            vec![
                "user_id",
                "user_api_key_end_user_id",
                "requester_metadata.user_id",
            ]
        );

        let metadata = json!({"conversation": "session_c1"});
        assert_eq!(extract_session_id(Some(&metadata)), None);
    }

    #[test]
    fn test_cached_tag_matches_fresh_resolution() {
        let mut span = Span::new("a");
        span.metadata = Some(json!({"user_api_key_end_user_id": "key_session_k9"}));

        let first = SessionIdResolver::default();
        assert_eq!(first.resolve_span(&span), Some("k9"));

        let second = SessionIdResolver::default();
        assert_eq!(
            second.resolve_span(&span).map(str::to_string),
            second.resolve(span.metadata.as_ref())
        );
    }

    #[test]
    fn test_session_key_falls_back_to_trace() {
        let resolver = SessionIdResolver::default();

        let mut tagged = Span::new("a");
        tagged.trace_id = Some("T1".to_string());
        tagged.metadata = Some(json!({"user_id": "u_session_s1"}));
        assert_eq!(resolver.session_key(&tagged), ("s1", true));

        let mut empty = Span::new("b");
        empty.trace_id = Some("T2".to_string());
        empty.metadata = Some(json!({"user_id": "u_session_"}));
        assert_eq!(resolver.session_key(&empty), ("T2", false));

        let bare = Span::new("c");
        assert_eq!(resolver.session_key(&bare), ("unknown", false));
    }
}
