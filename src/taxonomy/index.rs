//! Taxonomy index construction.
//!
//! The index is built by one sequential fold over taxonomies (configured
//! order) and records (input order):
//!
//! ```text
//! TaxonomyIndex
//! ├── tag
//! │   ├── action  { "Action", [#1, #2] }
//! │   └── rpg     { "RPG",    [#1] }
//! └── developer
//!     └── miel    { "Miel",   [#3] }
//! ```
//!
//! Order matters: the first display name seen for a slug wins, and members
//! keep first-seen order. Members are borrowed from the input records.

use super::{
    Record, RecordId, RecordLabel, TaxonomyDef, TaxonomySet, extract_terms, slug::slugify,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Index types
// ============================================================================

/// One term of a taxonomy with its members.
#[derive(Debug, Clone)]
pub struct TermEntry<'a> {
    slug: String,
    display_name: String,
    members: Vec<&'a Record>,
    /// Identities already in `members`, for O(1) dedup.
    member_ids: FxHashSet<RecordId>,
}

impl<'a> TermEntry<'a> {
    fn new(slug: String, display_name: String) -> Self {
        Self {
            slug,
            display_name,
            members: Vec::new(),
            member_ids: FxHashSet::default(),
        }
    }

    /// Add a record unless a member with the same identity is present.
    ///
    /// Records without identity are always appended. Returns whether the
    /// record was added.
    fn add_member(&mut self, record: &'a Record) -> bool {
        if let Some(id) = RecordId::of(record)
            && !self.member_ids.insert(id)
        {
            return false;
        }
        self.members.push(record);
        true
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Display name of the first occurrence of this slug.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn members(&self) -> &[&'a Record] {
        &self.members
    }
}

/// All terms of one taxonomy, in first-seen order.
#[derive(Debug, Clone)]
pub struct TaxonomyTerms<'a> {
    id: String,
    terms: Vec<TermEntry<'a>>,
    by_slug: FxHashMap<String, usize>,
}

impl<'a> TaxonomyTerms<'a> {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            terms: Vec::new(),
            by_slug: FxHashMap::default(),
        }
    }

    /// Entry for `slug`, created with `display_name` on first sight.
    fn entry(&mut self, slug: String, display_name: String) -> &mut TermEntry<'a> {
        let pos = match self.by_slug.get(&slug) {
            Some(&pos) => pos,
            None => {
                let pos = self.terms.len();
                self.by_slug.insert(slug.clone(), pos);
                self.terms.push(TermEntry::new(slug, display_name));
                pos
            }
        };
        &mut self.terms[pos]
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn terms(&self) -> &[TermEntry<'a>] {
        &self.terms
    }

    #[cfg(test)]
    pub fn get(&self, slug: &str) -> Option<&TermEntry<'a>> {
        self.by_slug.get(slug).map(|&pos| &self.terms[pos])
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Taxonomy id -> term slug -> term entry.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyIndex<'a> {
    taxonomies: Vec<TaxonomyTerms<'a>>,
}

impl<'a> TaxonomyIndex<'a> {
    /// Taxonomies in configured order.
    pub fn taxonomies(&self) -> &[TaxonomyTerms<'a>] {
        &self.taxonomies
    }

    #[cfg(test)]
    pub fn taxonomy(&self, id: &str) -> Option<&TaxonomyTerms<'a>> {
        self.taxonomies.iter().find(|t| t.id == id)
    }

    #[cfg(test)]
    /// Shorthand for `taxonomy(id)?.get(slug)`.
    pub fn term(&self, taxonomy: &str, slug: &str) -> Option<&TermEntry<'a>> {
        self.taxonomy(taxonomy)?.get(slug)
    }

    /// Total number of terms across all taxonomies.
    pub fn term_count(&self) -> usize {
        self.taxonomies.iter().map(TaxonomyTerms::len).sum()
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// A term that was skipped while building the index.
#[derive(Debug, Clone, PartialEq)]
pub enum TermWarning {
    /// Element that is not a usable term (wrong type, blank, no `name`).
    Malformed {
        taxonomy: String,
        record: RecordLabel,
        raw: Value,
    },
    /// Term whose slug came out empty, e.g. `"!!!"`.
    EmptySlug {
        taxonomy: String,
        record: RecordLabel,
        name: String,
    },
}

impl TermWarning {
    #[cfg(test)]
    pub fn taxonomy(&self) -> &str {
        match self {
            Self::Malformed { taxonomy, .. } | Self::EmptySlug { taxonomy, .. } => taxonomy,
        }
    }
}

impl fmt::Display for TermWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed {
                taxonomy,
                record,
                raw,
            } => write!(f, "{taxonomy}: skipped malformed term {raw} in record {record}"),
            Self::EmptySlug {
                taxonomy,
                record,
                name,
            } => write!(
                f,
                "{taxonomy}: skipped term {name:?} in record {record} (empty slug)"
            ),
        }
    }
}

// ============================================================================
// Fold
// ============================================================================

/// Result of [`build_index`]: the finished index plus everything skipped.
#[derive(Debug, Clone, Default)]
pub struct IndexBuild<'a> {
    pub index: TaxonomyIndex<'a>,
    pub warnings: Vec<TermWarning>,
}

/// Build the taxonomy index from records.
///
/// Never fails: malformed terms and empty slugs become [`TermWarning`]s.
/// Malformed definitions cannot reach this point (see [`TaxonomySet::new`]).
pub fn build_index<'a>(records: &'a [Record], taxonomies: &TaxonomySet) -> IndexBuild<'a> {
    taxonomies
        .iter()
        .fold(IndexBuild::default(), |mut build, def| {
            let terms = records.iter().enumerate().fold(
                TaxonomyTerms::new(&def.id),
                |terms, (position, record)| {
                    fold_record(terms, &mut build.warnings, def, position, record)
                },
            );
            build.index.taxonomies.push(terms);
            build
        })
}

/// Fold step: add one record's terms to one taxonomy.
fn fold_record<'a>(
    mut terms: TaxonomyTerms<'a>,
    warnings: &mut Vec<TermWarning>,
    def: &TaxonomyDef,
    position: usize,
    record: &'a Record,
) -> TaxonomyTerms<'a> {
    let (found, skipped) = extract_terms(record, position, def);

    warnings.extend(skipped.into_iter().map(|s| TermWarning::Malformed {
        taxonomy: def.id.clone(),
        record: s.record,
        raw: s.raw,
    }));

    for term in found {
        let name = term.into_name();
        let slug = slugify(&name);
        if slug.is_empty() {
            warnings.push(TermWarning::EmptySlug {
                taxonomy: def.id.clone(),
                record: RecordLabel::new(record, position),
                name,
            });
            continue;
        }
        terms.entry(slug, name).add_member(record);
    }

    terms
}
