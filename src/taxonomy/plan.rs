//! Page plan emission.
//!
//! Turns a finished [`TaxonomyIndex`] into one [`PagePlanEntry`] per
//! (taxonomy, term), in taxonomy order then term insertion order. Entries
//! borrow from the index, so they can only exist once building is done.

use super::{Record, TaxonomyIndex};
use serde::Serialize;

/// One taxonomy listing page to render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PagePlanEntry<'a> {
    pub taxonomy: &'a str,
    pub slug: &'a str,
    pub display_name: &'a str,
    /// Members exactly as accumulated, unsorted.
    pub members: &'a [&'a Record],
}

/// Lazily walk the index and yield page plan entries.
pub fn emit_plan<'i, 'a>(
    index: &'i TaxonomyIndex<'a>,
) -> impl Iterator<Item = PagePlanEntry<'i>> + 'i
where
    'a: 'i,
{
    index.taxonomies().iter().flat_map(|taxonomy| {
        taxonomy.terms().iter().map(move |term| PagePlanEntry {
            taxonomy: taxonomy.id(),
            slug: term.slug(),
            display_name: term.display_name(),
            members: term.members(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{TaxonomyDef, TaxonomySet, build_index};
    use serde_json::{Value, json};

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn ids(entry: &PagePlanEntry<'_>) -> Vec<Value> {
        entry.members.iter().map(|r| r["id"].clone()).collect()
    }

    #[test]
    fn test_end_to_end_plan() {
        let recs = records(json!([
            {"id": 1, "tags": ["Action", "RPG"]},
            {"id": 2, "tags": ["action"]},
        ]));
        let set = TaxonomySet::new(vec![TaxonomyDef::plain("tag", "tags")]).unwrap();
        let build = build_index(&recs, &set);
        let plan: Vec<_> = emit_plan(&build.index).collect();

        assert_eq!(plan.len(), 2);

        assert_eq!(plan[0].taxonomy, "tag");
        assert_eq!(plan[0].slug, "action");
        assert_eq!(plan[0].display_name, "Action");
        assert_eq!(ids(&plan[0]), [json!(1), json!(2)]);

        assert_eq!(plan[1].taxonomy, "tag");
        assert_eq!(plan[1].slug, "rpg");
        assert_eq!(plan[1].display_name, "RPG");
        assert_eq!(ids(&plan[1]), [json!(1)]);
    }

    #[test]
    fn test_plan_order_follows_taxonomies_then_terms() {
        let recs = records(json!([
            {"id": 1, "tags": ["B", "A"], "developers": [{"name": "Miel"}]},
            {"id": 2, "tags": ["C"], "developers": ["Key"]},
        ]));
        let set = TaxonomySet::new(vec![
            TaxonomyDef::structured("developer", "developers"),
            TaxonomyDef::plain("tag", "tags"),
        ])
        .unwrap();
        let build = build_index(&recs, &set);
        let keys: Vec<_> = emit_plan(&build.index)
            .map(|e| format!("{}/{}", e.taxonomy, e.slug))
            .collect();

        assert_eq!(
            keys,
            ["developer/miel", "developer/key", "tag/b", "tag/a", "tag/c"]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let recs = records(json!([
            {"id": 1, "tags": ["Action", "RPG", "Visual Novel"]},
            {"tags": ["rpg", "Puzzle"]},
            {"id": 3, "tags": "Action"},
            {"id": 1, "tags": ["Puzzle"]},
        ]));
        let set = TaxonomySet::new(vec![TaxonomyDef::plain("tag", "tags")]).unwrap();

        let first = build_index(&recs, &set);
        let second = build_index(&recs, &set);

        let a = serde_json::to_string(&emit_plan(&first.index).collect::<Vec<_>>()).unwrap();
        let b = serde_json::to_string(&emit_plan(&second.index).collect::<Vec<_>>()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_plan_empty_index() {
        let set = TaxonomySet::new(vec![TaxonomyDef::plain("tag", "tags")]).unwrap();
        let build = build_index(&[], &set);
        assert_eq!(emit_plan(&build.index).count(), 0);
    }

    #[test]
    fn test_plan_members_not_sorted() {
        let recs = records(json!([
            {"id": 3, "tags": ["X"]},
            {"id": 1, "tags": ["X"]},
            {"id": 2, "tags": ["X"]},
        ]));
        let set = TaxonomySet::new(vec![TaxonomyDef::plain("tag", "tags")]).unwrap();
        let build = build_index(&recs, &set);
        let plan: Vec<_> = emit_plan(&build.index).collect();
        assert_eq!(ids(&plan[0]), [json!(3), json!(1), json!(2)]);
    }
}
