//! Term extraction from a single record.
//!
//! Source fields come in several shapes:
//!
//! ```json
//! { "tags": ["Action", "RPG"] }            // list of strings
//! { "tags": "Action" }                      // single string
//! { "developers": [{ "name": "Miel" }] }   // list of objects (structured)
//! ```
//!
//! Scalars are treated as one-element lists. Elements that do not yield a
//! non-empty name are reported as [`SkippedTerm`]s instead of failing.

use super::{FieldKind, Record, RecordLabel, TaxonomyDef};
use serde_json::Value;
use std::slice;

/// Object key holding the display name of a structured term.
const NAME_KEY: &str = "name";

/// A term name as found in a record, tagged with the shape it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTerm {
    /// Plain string element.
    Scalar(String),
    /// `name` of an object element in a structured field.
    Structured(String),
}

impl RawTerm {
    /// Trimmed, non-empty display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(name) | Self::Structured(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Self::Scalar(name) | Self::Structured(name) => name,
        }
    }

    /// Resolve one element according to the field kind.
    fn resolve(value: &Value, kind: FieldKind) -> Option<Self> {
        match (kind, value) {
            (FieldKind::Structured, Value::Object(map)) => map
                .get(NAME_KEY)
                .and_then(Value::as_str)
                .and_then(non_blank)
                .map(Self::Structured),
            (_, Value::String(s)) => non_blank(s).map(Self::Scalar),
            _ => None,
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// An element that could not be turned into a term.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTerm {
    pub record: RecordLabel,
    pub raw: Value,
}

/// Extract the term names a record carries for one taxonomy.
///
/// `position` is the record's index in the input, used to label records
/// without an identity. Output order equals element order; duplicates are
/// kept (deduplication happens in the index).
pub fn extract_terms(
    record: &Record,
    position: usize,
    def: &TaxonomyDef,
) -> (Vec<RawTerm>, Vec<SkippedTerm>) {
    let elements: &[Value] = match record.get(&def.field) {
        // Missing field: the record just doesn't take part in this taxonomy.
        None | Some(Value::Null) => return (Vec::new(), Vec::new()),
        Some(Value::Array(items)) => items,
        Some(scalar) => slice::from_ref(scalar),
    };

    let mut terms = Vec::with_capacity(elements.len());
    let mut skipped = Vec::new();

    for element in elements {
        match RawTerm::resolve(element, def.kind) {
            Some(term) => terms.push(term),
            None => skipped.push(SkippedTerm {
                record: RecordLabel::new(record, position),
                raw: element.clone(),
            }),
        }
    }

    (terms, skipped)
}
