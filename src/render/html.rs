//! HTML fragments shared by the index and taxonomy pages.

use crate::taxonomy::{
    ID_FIELD, Record, TaxonomyIndex, TaxonomySet, extract_terms, slugify, slugify_value,
};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::Write;

/// Fallback title for records without any usable title field.
const UNTITLED: &str = "untitled";

/// Escape special HTML characters.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;"),
    )
}

/// Relative link to a term page, e.g. `../tag/action.html`.
pub fn term_href(root: &str, taxonomy: &str, slug: &str) -> String {
    format!("{root}{taxonomy}/{slug}.html")
}

/// What an item list needs to know besides the records.
#[derive(Debug, Clone, Copy)]
pub struct ItemContext<'a> {
    /// Record field holding the item title.
    pub title_field: &'a str,
    pub taxonomies: &'a TaxonomySet,
    /// Relative path from the current page to the output root.
    pub root: &'a str,
}

impl ItemContext<'_> {
    /// Title of a record: `title_field`, then `name`, then `id`.
    pub fn title<'r>(&self, record: &'r Record) -> Cow<'r, str> {
        [self.title_field, "name", "id"]
            .into_iter()
            .find_map(|field| match record.get(field)? {
                Value::String(s) if !s.trim().is_empty() => Some(Cow::Borrowed(s.trim())),
                Value::Number(n) => Some(Cow::Owned(n.to_string())),
                _ => None,
            })
            .unwrap_or(Cow::Borrowed(UNTITLED))
    }

    /// `<ul>` of records, each with links to its terms.
    ///
    /// Records with an `id` get an `item-<slug>` anchor.
    pub fn render_items<'r>(&self, records: impl IntoIterator<Item = &'r Record>) -> String {
        let mut html = String::from("<ul class=\"items\">\n");
        for (position, record) in records.into_iter().enumerate() {
            html.push_str("  <li class=\"item\"");
            let anchor = slugify_value(record.get(ID_FIELD));
            if !anchor.is_empty() {
                let _ = write!(html, " id=\"item-{anchor}\"");
            }
            let _ = write!(
                html,
                "><span class=\"item-title\">{}</span>",
                escape_html(&self.title(record))
            );
            html.push_str(&self.render_record_terms(record, position));
            html.push_str("</li>\n");
        }
        html.push_str("</ul>");
        html
    }

    /// Term links of one record, grouped by taxonomy.
    ///
    /// Terms that would be skipped by the index (malformed, empty slug) have
    /// no page and are left out silently.
    fn render_record_terms(&self, record: &Record, position: usize) -> String {
        let mut html = String::new();
        for def in self.taxonomies {
            let (terms, _) = extract_terms(record, position, def);
            let links: Vec<String> = terms
                .iter()
                .filter_map(|term| {
                    let slug = slugify(term.name());
                    (!slug.is_empty()).then(|| {
                        format!(
                            "<a href=\"{}\">{}</a>",
                            term_href(self.root, &def.id, &slug),
                            escape_html(term.name())
                        )
                    })
                })
                .collect();
            if links.is_empty() {
                continue;
            }
            let _ = write!(
                html,
                "<span class=\"item-terms\" data-taxonomy=\"{}\">{}</span>",
                def.id,
                links.join(", ")
            );
        }
        html
    }
}

/// Directory of every term page, grouped by taxonomy.
pub fn render_term_directory(index: &TaxonomyIndex<'_>, root: &str) -> String {
    let mut html = String::new();
    for taxonomy in index.taxonomies() {
        if taxonomy.is_empty() {
            continue;
        }
        let _ = writeln!(
            html,
            "<section class=\"taxonomy\" id=\"{id}\">\n  <h2>{id}</h2>\n  <ul>",
            id = taxonomy.id()
        );
        for term in taxonomy.terms() {
            let _ = writeln!(
                html,
                "    <li><a href=\"{}\">{}</a> <span class=\"count\">({})</span></li>",
                term_href(root, taxonomy.id(), term.slug()),
                escape_html(term.display_name()),
                term.members().len()
            );
        }
        html.push_str("  </ul>\n</section>\n");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{TaxonomyDef, build_index};
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn set() -> TaxonomySet {
        TaxonomySet::new(vec![
            TaxonomyDef::plain("tag", "tags"),
            TaxonomyDef::structured("developer", "developers"),
        ])
        .unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("hello"), "hello");
        assert!(matches!(escape_html("hello"), Cow::Borrowed(_)));
        assert_eq!(escape_html("<b>"), "&lt;b&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_term_href() {
        assert_eq!(term_href("", "tag", "action"), "tag/action.html");
        assert_eq!(term_href("../", "tag", "action"), "../tag/action.html");
    }

    #[test]
    fn test_title_fallbacks() {
        let taxonomies = set();
        let ctx = ItemContext {
            title_field: "title",
            taxonomies: &taxonomies,
            root: "",
        };
        let recs = records(json!([
            {"title": " Clannad ", "name": "ignored"},
            {"title": "", "name": "Named"},
            {"id": 7},
            {"tags": ["A"]},
        ]));
        let titles: Vec<_> = recs.iter().map(|r| ctx.title(r).into_owned()).collect();
        assert_eq!(titles, ["Clannad", "Named", "7", "untitled"]);
    }

    #[test]
    fn test_render_items_links_terms() {
        let taxonomies = set();
        let ctx = ItemContext {
            title_field: "title",
            taxonomies: &taxonomies,
            root: "../",
        };
        let recs = records(json!([
            {"id": 1, "title": "Fish & Chips", "tags": ["Action", "!!!"], "developers": [{"name": "Miel"}]},
        ]));
        let html = ctx.render_items(&recs);

        assert!(html.contains("Fish &amp; Chips"));
        assert!(html.contains(r#"<a href="../tag/action.html">Action</a>"#));
        assert!(html.contains(r#"<a href="../developer/miel.html">Miel</a>"#));
        // No link for a term without a slug
        assert!(!html.contains("!!!"));
    }

    #[test]
    fn test_render_items_id_anchors() {
        let taxonomies = set();
        let ctx = ItemContext {
            title_field: "title",
            taxonomies: &taxonomies,
            root: "",
        };
        let recs = records(json!([
            {"id": 7, "title": "Seven"},
            {"id": "Open World", "title": "Slugged"},
            {"id": null, "title": "Null id"},
            {"title": "No id"},
        ]));
        let html = ctx.render_items(&recs);

        assert!(html.contains(r#"<li class="item" id="item-7"><span class="item-title">Seven"#));
        assert!(html.contains(r#"<li class="item" id="item-open-world">"#));
        assert!(html.contains(r#"<li class="item"><span class="item-title">Null id"#));
        assert!(html.contains(r#"<li class="item"><span class="item-title">No id"#));
    }

    #[test]
    fn test_render_items_empty() {
        let taxonomies = set();
        let ctx = ItemContext {
            title_field: "title",
            taxonomies: &taxonomies,
            root: "",
        };
        assert_eq!(ctx.render_items(&Vec::<Record>::new()), "<ul class=\"items\">\n</ul>");
    }

    #[test]
    fn test_render_term_directory() {
        let taxonomies = set();
        let recs = records(json!([
            {"id": 1, "tags": ["Action", "<RPG>"]},
            {"id": 2, "tags": ["action"]},
        ]));
        let build = build_index(&recs, &taxonomies);
        let html = render_term_directory(&build.index, "");

        assert!(html.contains(r#"<a href="tag/action.html">Action</a> <span class="count">(2)</span>"#));
        assert!(html.contains(r#"<a href="tag/rpg.html">&lt;RPG&gt;</a>"#));
        // Empty taxonomies get no section
        assert!(!html.contains("id=\"developer\""));
    }
}
