use std::path::Path;

use crate::openinference::OpenInferenceSource;
use crate::traits::SpanSource;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub description: &'static str,
}

const SOURCES: &[SourceMetadata] = &[SourceMetadata {
    name: "openinference",
    description: "Arize Phoenix / OpenInference span export (NDJSON or JSON array)",
}];

pub fn get_all_sources() -> &'static [SourceMetadata] {
    SOURCES
}

pub fn get_source_names() -> Vec<&'static str> {
    SOURCES.iter().map(|s| s.name).collect()
}

/// Create a span source by name
pub fn create_source(name: &str) -> Result<Box<dyn SpanSource>> {
    match name {
        "openinference" => Ok(Box::new(OpenInferenceSource)),
        other => Err(Error::UnknownSource(other.to_string())),
    }
}

pub fn create_all_sources() -> Vec<Box<dyn SpanSource>> {
    vec![Box::new(OpenInferenceSource)]
}

/// Pick the source with the highest probe confidence for `path`.
pub fn detect_source(path: &Path) -> Result<Box<dyn SpanSource>> {
    create_all_sources()
        .into_iter()
        .map(|source| (source.probe(path), source))
        .filter(|(probe, _)| probe.is_match())
        .max_by(|(a, _), (b, _)| a.confidence().total_cmp(&b.confidence()))
        .map(|(_, source)| source)
        .ok_or_else(|| Error::UnknownSource(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_source_by_name() {
        assert_eq!(create_source("openinference").unwrap().id(), "openinference");
        assert!(matches!(
            create_source("jaeger"),
            Err(Error::UnknownSource(name)) if name == "jaeger"
        ));
    }

    #[test]
    fn test_names_match_registry() {
        let created: Vec<&str> = create_all_sources().iter().map(|s| s.id()).collect();
        assert_eq!(created, get_source_names());
    }
}
