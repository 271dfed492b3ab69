//! Query command implementation.
//!
//! Builds the taxonomy index without writing anything and prints the page
//! plan as JSON, one object per taxonomy page:
//!
//! ```json
//! [{"taxonomy":"tag","slug":"action","name":"Action","path":"public/tag/action.html","count":2,"ids":[1,2]}]
//! ```

use crate::{
    cli::QueryArgs,
    config::SiteConfig,
    data::load_records,
    debug,
    render::term_page_path,
    taxonomy::{ID_FIELD, PagePlanEntry, TaxonomyIndex, build_index, emit_plan},
    utils::plural::plural_count,
};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;

/// Id reported for members without an `id` field.
static NO_ID: Value = Value::Null;

/// One planned taxonomy page.
#[derive(Debug, Serialize)]
pub struct PlannedPage<'a> {
    pub taxonomy: &'a str,
    pub slug: &'a str,
    pub name: &'a str,
    /// Output file, relative to the site root.
    pub path: String,
    pub count: usize,
    pub ids: Vec<&'a Value>,
}

/// Execute query command
pub fn run_query(args: &QueryArgs, config: &SiteConfig) -> Result<()> {
    if let Some(id) = &args.taxonomy
        && config.taxonomy_set.get(id).is_none()
    {
        let known: Vec<_> = config.taxonomy_set.iter().map(|d| d.id.as_str()).collect();
        bail!("unknown taxonomy `{id}` (configured: {})", known.join(", "));
    }

    let loaded = load_records(&config.data.sources).context("Failed to load records")?;
    let build = build_index(&loaded.records, &config.taxonomy_set);
    for warning in &build.warnings {
        debug!("warning"; "{}", warning);
    }

    let pages = planned_pages(&build.index, config, args.taxonomy.as_deref());
    debug!("query"; "found {}", plural_count(pages.len(), "page"));

    let formatted = if args.pretty {
        serde_json::to_string_pretty(&pages)?
    } else {
        serde_json::to_string(&pages)?
    };
    println!("{formatted}");
    Ok(())
}

/// Page plan as reportable entries, optionally limited to one taxonomy.
pub fn planned_pages<'i>(
    index: &'i TaxonomyIndex<'_>,
    config: &SiteConfig,
    taxonomy: Option<&str>,
) -> Vec<PlannedPage<'i>> {
    emit_plan(index)
        .filter(|entry| taxonomy.is_none_or(|id| entry.taxonomy == id))
        .map(|entry| planned_page(entry, config))
        .collect()
}

fn planned_page<'i>(entry: PagePlanEntry<'i>, config: &SiteConfig) -> PlannedPage<'i> {
    let path = config.root_relative(term_page_path(&config.build.output, &entry));
    PlannedPage {
        taxonomy: entry.taxonomy,
        slug: entry.slug,
        name: entry.display_name,
        path: path.to_string_lossy().replace('\\', "/"),
        count: entry.members.len(),
        ids: entry
            .members
            .iter()
            .map(|record| record.get(ID_FIELD).unwrap_or(&NO_ID))
            .collect(),
    }
}
