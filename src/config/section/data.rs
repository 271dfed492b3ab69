//! `[data]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [data]
//! sources = ["data/games.json"]   # JSON files (relative to site root) or http(s) URLs, read in order
//! structured = ["developers"]     # Fields holding objects like { name = "Miel" }
//! ```

use crate::{
    config::{ConfigDiagnostics, FieldPath},
    data::remote_url,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Record sources, concatenated in order.
    pub sources: Vec<PathBuf>,

    /// Source fields whose elements are objects with a `name`.
    pub structured: Vec<String>,
}

impl DataConfig {
    pub const SOURCES: FieldPath = FieldPath::new("data.sources");
    pub const STRUCTURED: FieldPath = FieldPath::new("data.structured");

    /// Whether a record field carries structured terms.
    pub fn is_structured(&self, field: &str) -> bool {
        self.structured.iter().any(|f| f == field)
    }

    /// Pre-validate raw source paths before normalization.
    ///
    /// Must run before paths are joined with the root, which would turn a URL
    /// into a bogus local path.
    pub fn validate_sources(&self, diag: &mut ConfigDiagnostics) {
        for source in &self.sources {
            let looks_like_url = source.to_str().is_some_and(|s| s.contains("://"));
            if looks_like_url && remote_url(source).is_none() {
                diag.error_with_hint(
                    Self::SOURCES,
                    format!("unsupported URL scheme in source '{}'", source.display()),
                    "only http:// and https:// sources are fetched",
                );
            }
        }
    }

    /// Validate data configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.sources.is_empty() {
            diag.error_with_hint(
                Self::SOURCES,
                "no data sources configured",
                "add `sources = [\"data/items.json\"]` under [data]",
            );
        }
        for source in self.sources.iter().filter(|s| remote_url(s).is_none()) {
            if !source.is_file() {
                diag.error(
                    Self::SOURCES,
                    format!("data source '{}' not found", source.display()),
                );
            }
        }
    }

    /// Resolve local source paths against the site root. URLs are kept.
    pub fn normalize(&mut self, root: &Path) {
        for source in &mut self.sources {
            if remote_url(source).is_none() {
                *source = crate::utils::path::normalize_path(&root.join(&*source));
            }
        }
    }

    /// Local sources, the ones that live on disk.
    pub fn local_sources(&self) -> impl Iterator<Item = &Path> {
        self.sources
            .iter()
            .map(PathBuf::as_path)
            .filter(|s| remote_url(s).is_none())
    }
}
