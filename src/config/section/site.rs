//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "Visual Novels"     # Shown in page titles and headers
//! template = "index"          # Template for index.html (built-in or templates/<name>.html)
//! title_field = "title"       # Record field used as item title
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::render::INDEX_TEMPLATE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Site title.
    pub title: String,

    /// Template used for the index page.
    pub template: String,

    /// Record field holding the item title.
    pub title_field: String,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            title: "Site".into(),
            template: INDEX_TEMPLATE.into(),
            title_field: "title".into(),
        }
    }
}

impl SiteSectionConfig {
    pub const TEMPLATE: FieldPath = FieldPath::new("site.template");
    pub const TITLE_FIELD: FieldPath = FieldPath::new("site.title_field");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.template.trim().is_empty() {
            diag.error_with_hint(
                Self::TEMPLATE,
                "index template name is empty",
                format!("remove it to use the built-in `{INDEX_TEMPLATE}` template"),
            );
        }
        if self.title_field.trim().is_empty() {
            diag.error(Self::TITLE_FIELD, "title field is empty");
        }
    }
}
