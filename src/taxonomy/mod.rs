//! Taxonomy aggregation engine.
//!
//! Groups records under the terms they carry for every configured taxonomy
//! and turns the result into a page plan.
//!
//! # Module Structure
//!
//! | Module    | Purpose                                             |
//! |-----------|-----------------------------------------------------|
//! | `slug`    | Term text -> URL-safe slug                          |
//! | `extract` | One record + one taxonomy -> term names             |
//! | `index`   | Fold of all records into the taxonomy index         |
//! | `plan`    | Finished index -> page plan entries                 |
//!
//! # Phases
//!
//! ```text
//! records ──► extract_terms ──► build_index (fold) ──► emit_plan ──► renderer
//!                                  collect                emit
//! ```
//!
//! `build_index` owns the only mutable state and returns a finished
//! [`TaxonomyIndex`]; `emit_plan` only borrows it.

mod extract;
mod index;
mod plan;
mod slug;

pub use extract::extract_terms;
pub use index::{TaxonomyIndex, TermWarning, build_index};
pub use plan::{PagePlanEntry, emit_plan};
pub use slug::{slugify, slugify_value};

use rustc_hash::FxHashSet;
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

/// A single input record: field name -> JSON value.
pub type Record = Map<String, Value>;

/// Field holding a record's identity.
pub const ID_FIELD: &str = "id";

// ============================================================================
// Taxonomy definitions
// ============================================================================

/// Shape of the values stored in a taxonomy's source field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain strings (`"tags": ["Action", "RPG"]`).
    #[default]
    Plain,
    /// Objects carrying a `name` (`"developers": [{"name": "Miel"}]`).
    /// Plain strings are still accepted.
    Structured,
}

/// One configured taxonomy, e.g. `tag <- tags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyDef {
    /// Taxonomy identifier, used as output directory name.
    pub id: String,
    /// Record field the terms are read from.
    pub field: String,
    pub kind: FieldKind,
}

impl TaxonomyDef {
    pub fn new(id: impl Into<String>, field: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            kind,
        }
    }

    #[cfg(test)]
    pub fn plain(id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(id, field, FieldKind::Plain)
    }

    #[cfg(test)]
    pub fn structured(id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(id, field, FieldKind::Structured)
    }
}

/// Malformed taxonomy definition list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("taxonomy identifier is empty")]
    EmptyId,

    #[error("taxonomy `{id}` is not a valid path segment")]
    InvalidId { id: String, suggestion: String },

    #[error("taxonomy `{0}` has an empty source field")]
    EmptyField(String),

    #[error("taxonomy `{0}` is defined more than once")]
    Duplicate(String),
}

/// Validated, ordered list of taxonomy definitions.
///
/// The only way to feed definitions to [`build_index`], so a malformed list
/// is rejected before any record is looked at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomySet {
    defs: Vec<TaxonomyDef>,
}

impl TaxonomySet {
    /// Validate definitions, keeping their order.
    pub fn new(defs: Vec<TaxonomyDef>) -> Result<Self, DefinitionError> {
        let mut seen = FxHashSet::default();
        for def in &defs {
            if def.id.trim().is_empty() {
                return Err(DefinitionError::EmptyId);
            }
            // The id becomes a directory name, so it must already be a slug.
            let suggestion = slugify(&def.id);
            if suggestion != def.id {
                return Err(DefinitionError::InvalidId {
                    id: def.id.clone(),
                    suggestion,
                });
            }
            if def.field.trim().is_empty() {
                return Err(DefinitionError::EmptyField(def.id.clone()));
            }
            if !seen.insert(def.id.as_str()) {
                return Err(DefinitionError::Duplicate(def.id.clone()));
            }
        }
        Ok(Self { defs })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaxonomyDef> {
        self.defs.iter()
    }

    pub fn get(&self, id: &str) -> Option<&TaxonomyDef> {
        self.defs.iter().find(|def| def.id == id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl<'a> IntoIterator for &'a TaxonomySet {
    type Item = &'a TaxonomyDef;
    type IntoIter = std::slice::Iter<'a, TaxonomyDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Record identity
// ============================================================================

/// Largest integer an `f64` holds exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Identity of a record, taken from its `id` field.
///
/// Keyed by the JSON text of the value, so `1` and `"1"` stay distinct.
/// Numbers compare by value: `1`, `1.0` and `1e0` are one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// `None` when the record has no `id` or it is `null`.
    pub fn of(record: &Record) -> Option<Self> {
        match record.get(ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(Self(canonical_number(n))),
            Some(value) => Some(Self(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Integer-valued floats print as integers, so `-0.0` and `2.0` key like `0` and `2`.
fn canonical_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Human-readable reference to a record in warnings.
///
/// Uses the identity when there is one, the position in the input otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLabel {
    Id(RecordId),
    Index(usize),
}

impl RecordLabel {
    pub fn new(record: &Record, position: usize) -> Self {
        match RecordId::of(record) {
            Some(id) => Self::Id(id),
            None => Self::Index(position),
        }
    }
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {}", id.as_str()),
            Self::Index(i) => write!(f, "#{i}"),
        }
    }
}
