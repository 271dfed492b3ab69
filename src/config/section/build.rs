//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "public"           # Output directory (relative to site root)
//! templates = "templates"     # Template overrides (relative to site root, optional)
//! clean = true                # Remove the output directory before building
//! ```
//!
//! The output directory is wiped on clean builds, so it may not be the site
//! root or an ancestor of any site input (config, templates, local data).

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Build output directory.
    pub output: PathBuf,

    /// Directory with `<name>.html` template overrides.
    pub templates: PathBuf,

    /// Clean output directory before building.
    pub clean: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "public".into(),
            templates: "templates".into(),
            clean: true,
        }
    }
}

impl BuildSectionConfig {
    pub const OUTPUT: FieldPath = FieldPath::new("build.output");

    /// First of `root` and `inputs` that lives inside the output directory.
    pub fn overlapping_input<'a>(
        &self,
        root: &'a Path,
        inputs: impl IntoIterator<Item = &'a Path>,
    ) -> Option<&'a Path> {
        std::iter::once(root)
            .chain(inputs)
            .filter(|input| !input.as_os_str().is_empty())
            .find(|input| input.starts_with(&self.output))
    }

    /// Reject an output directory that would swallow the site's inputs.
    pub fn validate_output<'a>(
        &self,
        root: &'a Path,
        inputs: impl IntoIterator<Item = &'a Path>,
        diag: &mut ConfigDiagnostics,
    ) {
        let Some(input) = self.overlapping_input(root, inputs) else {
            return;
        };
        let message = if input == root {
            format!(
                "output directory '{}' contains the site root",
                self.output.display()
            )
        } else {
            format!(
                "output directory '{}' contains site input '{}'",
                self.output.display(),
                input.display()
            )
        };
        diag.error_with_hint(
            Self::OUTPUT,
            message,
            "use a dedicated directory such as `output = \"public\"`",
        );
    }
}
