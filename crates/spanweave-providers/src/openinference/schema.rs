use serde_json::{Map, Value};

// Column names of an OpenInference span export.
pub(crate) const SPAN_ID: &[&str] = &["context.span_id", "span_id"];
pub(crate) const TRACE_ID: &[&str] = &["context.trace_id", "trace_id"];
pub(crate) const PARENT_ID: &[&str] = &["parent_id"];
pub(crate) const START_TIME: &[&str] = &["start_time"];
pub(crate) const END_TIME: &[&str] = &["end_time"];
pub(crate) const NAME: &[&str] = &["name"];
pub(crate) const SPAN_KIND: &[&str] = &["span_kind", "attributes.openinference.span.kind"];
pub(crate) const METADATA: &[&str] = &["attributes.metadata"];
pub(crate) const INPUT_MESSAGES: &[&str] = &["attributes.llm.input_messages"];
pub(crate) const OUTPUT_MESSAGES: &[&str] = &["attributes.llm.output_messages"];
pub(crate) const INPUT_VALUE: &[&str] = &["attributes.input.value"];
pub(crate) const OUTPUT_VALUE: &[&str] = &["attributes.output.value"];

/// One exported span record.
///
/// Exports come either flattened (`"context.span_id": ...`) or nested
/// (`"context": {"span_id": ...}`). Lookups try the flat column first and then
/// walk the nested path.
#[derive(Debug, Clone)]
pub(crate) struct ExportRecord {
    fields: Map<String, Value>,
}

impl ExportRecord {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// First non-null value among `columns`.
    pub(crate) fn get(&self, columns: &[&str]) -> Option<&Value> {
        columns
            .iter()
            .find_map(|column| self.lookup(column).filter(|v| !v.is_null()))
    }

    fn lookup(&self, column: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(column) {
            return Some(value);
        }
        let mut parts = column.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ExportRecord {
        match value {
            Value::Object(map) => ExportRecord::new(map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_flat_and_nested_columns() {
        let flat = record(json!({"context.span_id": "a"}));
        let nested = record(json!({"context": {"span_id": "b"}}));
        assert_eq!(flat.get(SPAN_ID), Some(&json!("a")));
        assert_eq!(nested.get(SPAN_ID), Some(&json!("b")));
    }

    #[test]
    fn test_null_falls_through_to_next_column() {
        let r = record(json!({"span_kind": null, "attributes": {"openinference": {"span": {"kind": "LLM"}}}}));
        assert_eq!(r.get(SPAN_KIND), Some(&json!("LLM")));
    }
}
