//! `searchitems` console command: substring search over entity definitions
//! and their overlays.

use serde::{Deserialize, Serialize};

use crate::categories::CategoryTree;
use crate::error::StowageError;

/// Definition type the search is limited to without `--all`.
const ITEM_KIND: &str = "item";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDef {
    pub id: String,
    /// Definition type such as "item", "crew" or "ship".
    pub kind: Option<String>,
    pub friendly_name: Option<String>,
    pub name: Option<String>,
    pub starting_conds: Vec<String>,
    pub starting_cond_rules: Vec<String>,
}

impl EntityDef {
    fn is_item(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|k| k.eq_ignore_ascii_case(ITEM_KIND))
    }
}

/// A variant of a base definition with its own names and image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayDef {
    pub id: String,
    pub base_id: Option<String>,
    pub friendly_name: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionCatalog {
    pub definitions: Vec<EntityDef>,
    pub overlays: Vec<OverlayDef>,
}

impl DefinitionCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, StowageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn definition(&self, id: &str) -> Option<&EntityDef> {
        self.definitions.iter().find(|d| d.id == id)
    }
}

/// Friendly name, else name, else id.
fn display_name(id: &str, friendly: &Option<String>, name: &Option<String>) -> String {
    [friendly, name]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| id.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    /// Search every definition type, not only items.
    pub all: bool,
}

impl SearchQuery {
    /// Parse `searchitems <term> [--all]`. `None` when no term is given.
    pub fn parse(input: &str) -> Option<Self> {
        let (flags, words): (Vec<&str>, Vec<&str>) = input
            .split_whitespace()
            .skip(1)
            .partition(|w| w.eq_ignore_ascii_case("--all"));
        if words.is_empty() {
            return None;
        }
        Some(Self {
            term: words.join(" "),
            all: !flags.is_empty(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitKind {
    Definition { kind: Option<String> },
    Overlay { base_id: Option<String>, image: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub display_name: String,
    pub kind: HitKind,
    pub categories: Vec<String>,
    pub conditions: Vec<String>,
    pub cond_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// At most `limit` hits, sorted by display name.
    pub hits: Vec<SearchHit>,
    /// Number of matches before the limit was applied.
    pub total: usize,
}

pub fn search(
    catalog: &DefinitionCatalog,
    categories: &CategoryTree,
    query: &SearchQuery,
    limit: usize,
) -> SearchResults {
    let needle = query.term.to_lowercase();
    let hit = |s: &str| s.to_lowercase().contains(&needle);
    let opt_hit = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty() && hit(s));

    let mut hits = Vec::new();

    for def in &catalog.definitions {
        if !query.all && !def.is_item() {
            continue;
        }
        let shown = display_name(&def.id, &def.friendly_name, &def.name);
        if hit(&def.id) || hit(&shown) || opt_hit(&def.friendly_name) || opt_hit(&def.name) {
            hits.push(SearchHit {
                id: def.id.clone(),
                display_name: shown,
                kind: HitKind::Definition {
                    kind: def.kind.clone(),
                },
                categories: categories.categories_containing(&def.id),
                conditions: def.starting_conds.clone(),
                cond_rules: def.starting_cond_rules.clone(),
            });
        }
    }

    for overlay in &catalog.overlays {
        let base = overlay.base_id.as_deref().and_then(|b| catalog.definition(b));
        if !query.all && base.is_some_and(|b| !b.is_item()) {
            continue;
        }
        if hit(&overlay.id)
            || opt_hit(&overlay.friendly_name)
            || opt_hit(&overlay.name)
            || opt_hit(&overlay.base_id)
        {
            hits.push(SearchHit {
                id: overlay.id.clone(),
                display_name: display_name(&overlay.id, &overlay.friendly_name, &overlay.name),
                kind: HitKind::Overlay {
                    base_id: overlay.base_id.clone(),
                    image: overlay.image.clone(),
                },
                categories: categories.categories_containing(&overlay.id),
                conditions: Vec::new(),
                cond_rules: Vec::new(),
            });
        }
    }

    hits.sort_by_cached_key(|h| h.display_name.to_lowercase());
    let total = hits.len();
    hits.truncate(limit);
    log::info!("searchitems {:?}: {} matches", query.term, total);
    SearchResults { hits, total }
}

/// Console lines for a search, in the order they are printed.
pub fn render(query: &SearchQuery, results: &SearchResults) -> Vec<String> {
    let scope = if query.all { "all definitions" } else { "items" };
    let mut lines = vec![format!("Searching {} matching '{}'...", scope, query.term)];
    if results.total == 0 {
        lines.push(format!("No items found matching '{}'", query.term));
        return lines;
    }

    lines.push(format!("Found {} item(s):", results.total));
    for hit in &results.hits {
        let tag = match &hit.kind {
            HitKind::Overlay { base_id, .. } => match base_id {
                Some(base) => format!(" (Overlay) Base: {}", base),
                None => " (Overlay)".to_string(),
            },
            HitKind::Definition { kind: Some(kind) } if query.all => format!(" ({})", kind),
            HitKind::Definition { .. } => " (Item)".to_string(),
        };
        lines.push(format!("  {} [{}]{}", hit.display_name, hit.id, tag));
        if hit.categories.is_empty() {
            lines.push("    Categories: [None]".to_string());
        } else {
            lines.push(format!("    Categories: {}", hit.categories.join(", ")));
        }
        if !hit.conditions.is_empty() {
            lines.push(format!("    Conditions: {}", hit.conditions.join(", ")));
        }
        if !hit.cond_rules.is_empty() {
            lines.push(format!("    Cond Rules: {}", hit.cond_rules.join(", ")));
        }
        if let HitKind::Overlay { base_id, image } = &hit.kind {
            let mut line = format!(
                "    Overlay for: {}",
                base_id.as_deref().unwrap_or("Unknown")
            );
            if let Some(img) = image.as_deref().filter(|i| !i.is_empty()) {
                line.push_str(&format!(" Img: {}", img));
            }
            lines.push(line);
        }
    }
    if results.total > results.hits.len() {
        lines.push(format!(
            "... and {} more. Refine your search to see all results.",
            results.total - results.hits.len()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{Category, ItemHint};

    fn def(id: &str, kind: &str, friendly: Option<&str>) -> EntityDef {
        EntityDef {
            id: id.into(),
            kind: Some(kind.into()),
            friendly_name: friendly.map(Into::into),
            ..Default::default()
        }
    }

    fn catalog() -> DefinitionCatalog {
        DefinitionCatalog {
            definitions: vec![
                def("ItmWrench01", "Item", Some("Wrench")),
                def("ItmSpanner", "item", Some("adjustable spanner")),
                def("CrewWrenchExpert", "crew", None),
                EntityDef {
                    starting_conds: vec!["IsTool".into()],
                    ..def("ItmTrencher", "item", Some("Trencher"))
                },
            ],
            overlays: vec![
                OverlayDef {
                    id: "ItmWrench01Rusty".into(),
                    base_id: Some("ItmWrench01".into()),
                    friendly_name: Some("Rusty Wrench".into()),
                    ..Default::default()
                },
                OverlayDef {
                    id: "CrewWrenchExpertAlt".into(),
                    base_id: Some("CrewWrenchExpert".into()),
                    ..Default::default()
                },
            ],
        }
    }

    fn tree() -> CategoryTree {
        CategoryTree::new(vec![Category {
            id: "Tools".into(),
            display_name: "Tools".into(),
            items: vec![ItemHint::new("ItmWrench01")],
            subcategories: vec![],
        }])
    }

    #[test]
    fn parse_extracts_term_and_flag() {
        assert_eq!(
            SearchQuery::parse("searchitems wrench --all"),
            Some(SearchQuery {
                term: "wrench".into(),
                all: true
            })
        );
        assert_eq!(
            SearchQuery::parse("  searchitems  Trencher "),
            Some(SearchQuery {
                term: "Trencher".into(),
                all: false
            })
        );
        assert_eq!(
            SearchQuery::parse("searchitems --All heavy  wrench"),
            Some(SearchQuery {
                term: "heavy wrench".into(),
                all: true
            })
        );
        assert_eq!(SearchQuery::parse("searchitems"), None);
        assert_eq!(SearchQuery::parse("searchitems --all"), None);
    }

    #[test]
    fn items_only_unless_all() {
        let q = SearchQuery::parse("searchitems wrench").unwrap();
        let results = search(&catalog(), &tree(), &q, 50);
        let ids: Vec<_> = results.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["ItmWrench01Rusty", "ItmWrench01"]);
        assert_eq!(results.hits[1].categories, vec!["Tools".to_string()]);

        let q = SearchQuery::parse("searchitems wrench --all").unwrap();
        assert_eq!(search(&catalog(), &tree(), &q, 50).total, 4);
    }

    #[test]
    fn sorted_case_insensitively_and_limited() {
        let q = SearchQuery::parse("searchitems itm").unwrap();
        let results = search(&catalog(), &tree(), &q, 2);
        assert_eq!(results.total, 4);
        let names: Vec<_> = results.hits.iter().map(|h| h.display_name.as_str()).collect();
        assert_eq!(names, vec!["adjustable spanner", "Rusty Wrench"]);

        let lines = render(&q, &results);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("... and 2 more. Refine your search to see all results.")
        );
    }

    #[test]
    fn render_lists_conditions() {
        let q = SearchQuery::parse("searchitems trencher").unwrap();
        let results = search(&catalog(), &tree(), &q, 50);
        let lines = render(&q, &results);
        assert!(lines.contains(&"  Trencher [ItmTrencher] (Item)".to_string()));
        assert!(lines.contains(&"    Conditions: IsTool".to_string()));
        assert!(lines.contains(&"    Categories: [None]".to_string()));
    }

    #[test]
    fn catalog_loads_from_json() {
        let json = r#"{"definitions":[{"id":"ItmA","kind":"item"}],"overlays":[{"id":"ItmAx","base_id":"ItmA"}]}"#;
        let catalog = DefinitionCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.definitions.len(), 1);
        assert_eq!(catalog.overlays[0].base_id.as_deref(), Some("ItmA"));
    }
}
