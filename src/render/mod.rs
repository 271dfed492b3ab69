//! Page rendering and writing.
//!
//! # Module Structure
//!
//! - `template` - Template types and `__KEY__` placeholder substitution
//! - `html` - Item lists, term links, HTML escaping
//!
//! # Templates
//!
//! Two templates are built in: `index` and `taxonomy`. A file
//! `<templates>/<name>.html` replaces the built-in of the same name, and can
//! add new names for `site.template`.
//!
//! | Template   | Placeholders                                                        |
//! |------------|---------------------------------------------------------------------|
//! | `index`    | `__SITE_TITLE__` `__RECORD_COUNT__` `__ITEMS__` `__TAXONOMIES__`    |
//! | `taxonomy` | `__SITE_TITLE__` `__TAXONOMY__` `__TERM__` `__SLUG__` `__COUNT__` `__ITEMS__` `__ROOT__` |
//!
//! # Output
//!
//! ```text
//! public/
//! ├── index.html
//! └── tag/
//!     ├── action.html
//!     └── rpg.html
//! ```

pub mod html;
mod template;

pub use template::{Template, TemplateVars, fill};

use crate::taxonomy::{PagePlanEntry, Record, TaxonomyIndex, TaxonomySet};
use anyhow::{Context, Result, anyhow};
use html::{ItemContext, escape_html, render_term_directory};
use rustc_hash::FxHashMap;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Template used for every taxonomy listing page.
pub const TAXONOMY_TEMPLATE: &str = "taxonomy";

/// Default template for the index page.
pub const INDEX_TEMPLATE: &str = "index";

const TEMPLATE_EXT: &str = "html";

const BUILTIN_INDEX: &str = include_str!("templates/index.html");
const BUILTIN_TAXONOMY: &str = include_str!("templates/taxonomy.html");

// ============================================================================
// Template variables
// ============================================================================

/// Variables for the index page.
pub struct IndexVars<'a> {
    pub site_title: &'a str,
    pub record_count: usize,
    pub items: &'a str,
    pub taxonomies: &'a str,
}

impl TemplateVars for IndexVars<'_> {
    fn apply(&self, content: &str) -> String {
        let title = escape_html(self.site_title);
        let count = self.record_count.to_string();
        fill(
            content,
            &[
                ("SITE_TITLE", &*title),
                ("RECORD_COUNT", count.as_str()),
                ("ITEMS", self.items),
                ("TAXONOMIES", self.taxonomies),
            ],
        )
    }
}

/// Variables for a taxonomy listing page.
pub struct TaxonomyVars<'a> {
    pub site_title: &'a str,
    pub taxonomy: &'a str,
    pub term: &'a str,
    pub slug: &'a str,
    pub count: usize,
    pub items: &'a str,
    /// Relative path back to the output root.
    pub root: &'a str,
}

impl TemplateVars for TaxonomyVars<'_> {
    fn apply(&self, content: &str) -> String {
        let title = escape_html(self.site_title);
        let term = escape_html(self.term);
        let count = self.count.to_string();
        fill(
            content,
            &[
                ("SITE_TITLE", &*title),
                ("TAXONOMY", self.taxonomy),
                ("TERM", &*term),
                ("SLUG", self.slug),
                ("COUNT", count.as_str()),
                ("ITEMS", self.items),
                ("ROOT", self.root),
            ],
        )
    }
}

// ============================================================================
// Template set
// ============================================================================

/// Built-in templates plus overrides from the templates directory.
#[derive(Debug, Default)]
pub struct Templates {
    dir: Option<PathBuf>,
    overrides: FxHashMap<String, String>,
}

impl Templates {
    /// Load every `*.html` file in `dir`. A missing directory is not an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut templates = Self {
            dir: Some(dir.to_path_buf()),
            overrides: FxHashMap::default(),
        };
        if !dir.is_dir() {
            crate::debug!("render"; "no templates directory at {}, using built-ins", dir.display());
            return Ok(templates);
        }

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read templates directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != TEMPLATE_EXT) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            crate::debug!("render"; "template `{}` from {}", name, path.display());
            templates.overrides.insert(name.to_string(), content);
        }
        Ok(templates)
    }

    /// Look up a template by name: override first, then built-in.
    pub fn get<V>(&self, name: &str) -> Result<Template<'_, V>> {
        if let Some(content) = self.overrides.get(name) {
            return Ok(Template::new(content.as_str()));
        }
        match name {
            INDEX_TEMPLATE => Ok(Template::builtin(BUILTIN_INDEX)),
            TAXONOMY_TEMPLATE => Ok(Template::builtin(BUILTIN_TAXONOMY)),
            _ => Err(match &self.dir {
                Some(dir) => anyhow!(
                    "Template `{name}` not found: {}",
                    dir.join(format!("{name}.{TEMPLATE_EXT}")).display()
                ),
                None => anyhow!("Template `{name}` not found"),
            }),
        }
    }
}

// ============================================================================
// Site renderer
// ============================================================================

/// Renders the index page and taxonomy pages into an output directory.
pub struct SiteRenderer<'a> {
    pub templates: &'a Templates,
    pub output: &'a Path,
    pub site_title: &'a str,
    /// Template name for the index page.
    pub index_template: &'a str,
    pub title_field: &'a str,
    pub taxonomies: &'a TaxonomySet,
}

impl SiteRenderer<'_> {
    pub fn index_path(&self) -> PathBuf {
        self.output.join("index.html")
    }

    /// `<output>/<taxonomy>/<slug>.html`
    pub fn term_path(&self, entry: &PagePlanEntry<'_>) -> PathBuf {
        term_page_path(self.output, entry)
    }

    fn items<'s>(&'s self, root: &'s str) -> ItemContext<'s> {
        ItemContext {
            title_field: self.title_field,
            taxonomies: self.taxonomies,
            root,
        }
    }

    /// Render the index page listing every record and every term page.
    pub fn render_index(&self, records: &[Record], index: &TaxonomyIndex<'_>) -> Result<String> {
        let template = self.templates.get::<IndexVars<'_>>(self.index_template)?;
        let items = self.items("").render_items(records);
        let taxonomies = render_term_directory(index, "");
        Ok(template.render(&IndexVars {
            site_title: self.site_title,
            record_count: records.len(),
            items: &items,
            taxonomies: &taxonomies,
        }))
    }

    /// Render one taxonomy listing page.
    pub fn render_term(&self, entry: &PagePlanEntry<'_>) -> Result<String> {
        let template = self.templates.get::<TaxonomyVars<'_>>(TAXONOMY_TEMPLATE)?;
        // Term pages live one directory below the root
        let root = "../";
        let items = self.items(root).render_items(entry.members.iter().copied());
        Ok(template.render(&TaxonomyVars {
            site_title: self.site_title,
            taxonomy: entry.taxonomy,
            term: entry.display_name,
            slug: entry.slug,
            count: entry.members.len(),
            items: &items,
            root,
        }))
    }
}

/// Output path of a taxonomy page.
pub fn term_page_path(output: &Path, entry: &PagePlanEntry<'_>) -> PathBuf {
    output
        .join(entry.taxonomy)
        .join(format!("{}.{TEMPLATE_EXT}", entry.slug))
}

/// Write a rendered page, creating parent directories as needed.
pub fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}
