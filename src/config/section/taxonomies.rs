//! `[taxonomies]` section configuration.
//!
//! Maps each taxonomy id to the record field its terms are read from. The
//! order of the entries is the order pages are generated in.
//!
//! # Example
//!
//! ```toml
//! [taxonomies]
//! tag = "tags"                # public/tag/<slug>.html from record.tags
//! developer = "developers"    # public/developer/<slug>.html from record.developers
//! ```
//!
//! Whether a field holds objects (`{ name = ... }`) is declared in
//! `[data].structured`.

use super::DataConfig;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::taxonomy::{DefinitionError, FieldKind, TaxonomyDef, TaxonomySet};
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

/// Raw `[taxonomies]` table, shape-checked by [`TaxonomiesConfig::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonomiesConfig(pub Table);

impl TaxonomiesConfig {
    pub const FIELD: FieldPath = FieldPath::new("taxonomies");

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turn the table into a validated [`TaxonomySet`].
    ///
    /// Returns `None` when any entry is malformed; every problem is recorded
    /// in `diag`.
    pub fn resolve(&self, data: &DataConfig, diag: &mut ConfigDiagnostics) -> Option<TaxonomySet> {
        let mut defs = Vec::with_capacity(self.0.len());
        let mut malformed = false;

        for (id, value) in &self.0 {
            let Value::String(field) = value else {
                diag.error_with_hint(
                    Self::FIELD,
                    format!(
                        "`{id}` must map to a source field name, found {}",
                        value.type_str()
                    ),
                    format!("{id} = \"{id}s\""),
                );
                malformed = true;
                continue;
            };
            let kind = if data.is_structured(field) {
                FieldKind::Structured
            } else {
                FieldKind::Plain
            };
            defs.push(TaxonomyDef::new(id.as_str(), field.as_str(), kind));
        }

        for field in &data.structured {
            if !defs.iter().any(|def| &def.field == field) {
                diag.hint(
                    DataConfig::STRUCTURED,
                    format!("'{field}' is not the source field of any taxonomy"),
                );
            }
        }

        if malformed {
            return None;
        }

        match TaxonomySet::new(defs) {
            Ok(set) => Some(set),
            Err(err) => {
                Self::report(&err, diag);
                None
            }
        }
    }

    fn report(err: &DefinitionError, diag: &mut ConfigDiagnostics) {
        match err {
            DefinitionError::InvalidId { suggestion, .. } if !suggestion.is_empty() => {
                diag.error_with_hint(
                    Self::FIELD,
                    err.to_string(),
                    format!("rename it to `{suggestion}`"),
                );
            }
            DefinitionError::InvalidId { .. } => diag.error_with_hint(
                Self::FIELD,
                err.to_string(),
                "use lowercase ASCII letters, digits, `-` or `_`",
            ),
            _ => diag.error(Self::FIELD, err.to_string()),
        }
    }
}
