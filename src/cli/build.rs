//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Load** - Read and concatenate records from every data source
//! - **Init** - Prepare (and optionally clean) the output directory
//! - **Index** - Fold records into the taxonomy index, report skipped terms
//! - **Render** - Index page, then one page per plan entry
//! - **Finalize** - Summary, failure count

use crate::{
    config::SiteConfig,
    data::load_records,
    log,
    logger::{ProgressLine, is_verbose},
    render::{SiteRenderer, Templates, write_page},
    taxonomy::{PagePlanEntry, TermWarning, build_index, emit_plan},
    utils::plural::plural_count,
};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Warnings printed before the rest are summarized (without `--verbose`).
const WARNING_PREVIEW: usize = 5;

/// Counts reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub records: usize,
    /// Taxonomy pages written (the index page is not counted).
    pub pages: usize,
    pub warnings: usize,
}

/// Build the entire site.
///
/// Pipeline: load -> init -> index -> render -> finalize
///
/// Page failures do not stop the build; they are logged as they happen and
/// turn into an error once every page has been attempted.
pub fn build_site(config: &SiteConfig) -> Result<BuildSummary> {
    // Load
    let loaded = load_records(&config.data.sources).context("Failed to load records")?;
    log!("build"; "loaded {}", plural_count(loaded.records.len(), "record"));
    if loaded.skipped > 0 {
        log!("warning"; "{} skipped", plural_count(loaded.skipped, "non-object entry"));
    }

    // Init
    if let Some(input) = config.build.overlapping_input(&config.root, config.inputs()) {
        bail!(
            "output directory {} contains site input {}, refusing to write there",
            config.build.output.display(),
            input.display()
        );
    }
    prepare_output(&config.build.output, config.build.clean)?;
    let templates = Templates::load(&config.build.templates)?;

    // Index
    let build = build_index(&loaded.records, &config.taxonomy_set);
    report_warnings(&build.warnings);

    let renderer = SiteRenderer {
        templates: &templates,
        output: &config.build.output,
        site_title: &config.site.title,
        index_template: &config.site.template,
        title_field: &config.site.title_field,
        taxonomies: &config.taxonomy_set,
    };
    let mut failures = 0;

    // Render: index
    let index_path = renderer.index_path();
    let index_written = match renderer
        .render_index(&loaded.records, &build.index)
        .and_then(|html| write_page(&index_path, &html))
    {
        Ok(()) => true,
        Err(e) => {
            log!("error"; "{}: {:#}", config.root_relative(&index_path).display(), e);
            failures += 1;
            false
        }
    };

    // Render: taxonomy pages
    let progress = ProgressLine::new(&[("pages", build.index.term_count())]);
    let mut pages = 0;
    for entry in emit_plan(&build.index) {
        match render_term_page(&renderer, &entry) {
            Ok(()) => pages += 1,
            Err(e) => {
                log!("error"; "{}/{}: {:#}", entry.taxonomy, entry.slug, e);
                failures += 1;
            }
        }
        progress.inc("pages");
    }
    progress.finish();

    // Finalize
    let summary = BuildSummary {
        records: loaded.records.len(),
        pages,
        warnings: build.warnings.len(),
    };
    log!(
        "build";
        "{} into {}, {} in {}",
        plural_count(summary.records, "record"),
        plural_count(summary.pages + usize::from(index_written), "page"),
        plural_count(summary.warnings, "warning"),
        config.root_relative(&config.build.output).display()
    );

    if failures > 0 {
        bail!("{} failed to build", plural_count(failures, "page"));
    }
    Ok(summary)
}

fn render_term_page(renderer: &SiteRenderer<'_>, entry: &PagePlanEntry<'_>) -> Result<()> {
    let html = renderer.render_term(entry)?;
    write_page(&renderer.term_path(entry), &html)
}

/// Create the output directory, removing it first when `clean` is set.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output).with_context(|| {
            format!("Failed to clear output directory: {}", output.display())
        })?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Log skipped terms: all of them with `--verbose`, otherwise a preview.
fn report_warnings(warnings: &[TermWarning]) {
    let shown = if is_verbose() {
        warnings.len()
    } else {
        warnings.len().min(WARNING_PREVIEW)
    };
    for warning in &warnings[..shown] {
        log!("warning"; "{}", warning);
    }
    if shown < warnings.len() {
        log!(
            "warning";
            "... and {} more (use --verbose to see all)",
            warnings.len() - shown
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{TaxonomyDef, TaxonomySet};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn site(dir: &Path, records: serde_json::Value) -> SiteConfig {
        let source = dir.join("items.json");
        fs::write(&source, records.to_string()).unwrap();

        let mut config = SiteConfig::default();
        config.set_root(dir);
        config.site.title = "Catalog".into();
        config.build.output = dir.join("public");
        config.build.templates = dir.join("templates");
        config.data.sources = vec![source];
        config.taxonomy_set = TaxonomySet::new(vec![
            TaxonomyDef::plain("tag", "tags"),
            TaxonomyDef::structured("developer", "developers"),
        ])
        .unwrap();
        config
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_build_site_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = site(
            dir.path(),
            json!([
                {"id": 1, "title": "A", "tags": ["Action", "RPG"], "developers": [{"name": "Key"}]},
                {"id": 2, "title": "B", "tags": ["action"]},
                {"id": 3, "title": "C", "tags": ["!!!", 42]},
            ]),
        );

        let summary = build_site(&config).unwrap();
        assert_eq!(
            summary,
            BuildSummary {
                records: 3,
                pages: 3,
                warnings: 2
            }
        );

        let out = dir.path().join("public");
        let index = read(out.join("index.html"));
        assert!(index.contains("3 items"));
        assert!(index.contains(r#"href="developer/key.html""#));

        let action = read(out.join("tag/action.html"));
        assert!(action.contains("Action"));
        assert!(action.contains("2 items"));
        assert!(out.join("tag/rpg.html").is_file());
        assert!(out.join("developer/key.html").is_file());
    }

    #[test]
    fn test_build_site_clean() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path(), json!([{"id": 1, "tags": ["x"]}]));
        let stale = dir.path().join("public/stale.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        config.build.clean = false;
        build_site(&config).unwrap();
        assert!(stale.exists());

        config.build.clean = true;
        build_site(&config).unwrap();
        assert!(!stale.exists());
        assert!(dir.path().join("public/tag/x.html").is_file());
    }

    #[test]
    fn test_build_site_missing_template_fails_after_rendering() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path(), json!([{"id": 1, "tags": ["x"]}]));
        config.site.template = "missing".into();

        let err = build_site(&config).unwrap_err();
        assert!(err.to_string().contains("1 page failed"));
        // Taxonomy pages are still written
        assert!(dir.path().join("public/tag/x.html").is_file());
        assert!(!dir.path().join("public/index.html").exists());
    }

    #[test]
    fn test_build_site_refuses_output_over_inputs() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("taxa.toml");
        fs::write(&config_path, "").unwrap();

        let mut config = site(dir.path(), json!([{"id": 1, "tags": ["x"]}]));
        config.config_path = config_path.clone();
        config.build.clean = true;

        // Site root itself
        config.build.output = dir.path().to_path_buf();
        let err = build_site(&config).unwrap_err();
        assert!(err.to_string().contains("refusing"));

        // Directory holding the data source
        let data_dir = dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        let source = data_dir.join("items.json");
        fs::write(&source, r#"[{"id": 1}]"#).unwrap();
        config.data.sources = vec![source.clone()];
        config.build.output = data_dir;
        assert!(build_site(&config).is_err());

        assert!(config_path.is_file());
        assert!(source.is_file());
        assert!(dir.path().join("items.json").is_file());
    }

    #[test]
    fn test_build_site_bad_source() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path(), json!([]));
        config.data.sources = vec![dir.path().join("nope.json")];
        assert!(build_site(&config).is_err());
    }
}
