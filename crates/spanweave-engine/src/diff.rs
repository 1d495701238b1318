use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};
use spanweave_types::{ContainmentCheck, ContentPattern, MessageComparison};

/// Canonical text form for message records.
///
/// Objects serialize with keys sorted at every depth, so records that differ
/// only in field order compare equal. Strings compare by their plain text and
/// other scalars by their JSON text. Fields named in `ignored_fields` are
/// dropped before serialization, which lets callers treat records that differ
/// only in client-added bookkeeping as the same message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Canonicalizer {
    ignored_fields: BTreeSet<String>,
}

impl Canonicalizer {
    /// Exact structural equality.
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn ignoring<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ignored_fields(&self) -> impl Iterator<Item = &str> {
        self.ignored_fields.iter().map(String::as_str)
    }

    pub fn canonical(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Object(_) | Value::Array(_) => self.normalize(value).to_string(),
            other => other.to_string(),
        }
    }

    pub fn canonicalize_all(&self, values: &[Value]) -> Vec<String> {
        values.iter().map(|v| self.canonical(v)).collect()
    }

    fn normalize(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map
                    .keys()
                    .filter(|k| !self.ignored_fields.contains(k.as_str()))
                    .collect();
                keys.sort();
                let mut sorted = Map::new();
                for key in keys {
                    sorted.insert(key.clone(), self.normalize(&map[key.as_str()]));
                }
                Value::Object(sorted)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.normalize(v)).collect()),
            other => other.clone(),
        }
    }

    /// Overlap and growth between two message lists.
    pub fn compare_messages(&self, earlier: &[Value], later: &[Value]) -> MessageComparison {
        let earlier = self.canonicalize_all(earlier);
        let later = self.canonicalize_all(later);
        let earlier_set: HashSet<&str> = earlier.iter().map(String::as_str).collect();
        let later_set: HashSet<&str> = later.iter().map(String::as_str).collect();

        let duplicated_messages: Vec<String> = earlier
            .iter()
            .filter(|m| later_set.contains(m.as_str()))
            .cloned()
            .collect();
        let new_messages: Vec<String> = later
            .iter()
            .filter(|m| !earlier_set.contains(m.as_str()))
            .cloned()
            .collect();

        MessageComparison {
            total_previous: earlier.len(),
            total_current: later.len(),
            duplicated_count: duplicated_messages.len(),
            new_count: new_messages.len(),
            overlap_percentage: percentage(duplicated_messages.len(), later.len()),
            duplicated_messages,
            new_messages,
        }
    }

    /// Whether every earlier message reappears in `later`.
    pub fn check_complete_containment(&self, earlier: &[Value], later: &[Value]) -> ContainmentCheck {
        let earlier = self.canonicalize_all(earlier);
        let later = self.canonicalize_all(later);
        let later_set: HashSet<&str> = later.iter().map(String::as_str).collect();

        let (contained, missing): (Vec<&String>, Vec<&String>) =
            earlier.iter().partition(|m| later_set.contains(m.as_str()));

        ContainmentCheck {
            is_complete_subset: missing.is_empty() && !earlier.is_empty(),
            total_earlier: earlier.len(),
            contained_count: contained.len(),
            missing_count: missing.len(),
            containment_percentage: percentage(contained.len(), earlier.len()),
            missing_messages: missing.into_iter().cloned().collect(),
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Compare with exact structural equality.
pub fn compare_messages(earlier: &[Value], later: &[Value]) -> MessageComparison {
    Canonicalizer::exact().compare_messages(earlier, later)
}

/// Containment with exact structural equality.
pub fn check_complete_containment(earlier: &[Value], later: &[Value]) -> ContainmentCheck {
    Canonicalizer::exact().check_complete_containment(earlier, later)
}

/// Name the content movement between two turns.
pub fn classify(containment: &ContainmentCheck, comparison: &MessageComparison) -> ContentPattern {
    if containment.is_complete_subset {
        if comparison.new_count > 0 {
            ContentPattern::Accumulation
        } else {
            ContentPattern::Duplication
        }
    } else if containment.missing_count > 0 {
        ContentPattern::Loss
    } else {
        ContentPattern::Disjoint
    }
}
