//! Title-keyed relation graph.
//!
//! # Responsibility
//! - Derive outgoing and incoming relations of an item from tag strings.
//! - Propagate a title rename into every relation that targets it.
//!
//! # Invariants
//! - Relations live only in `Item::tags`; nothing here is persisted apart
//!   from the rewritten tag strings of `propagate_rename`.
//! - `propagate_rename` only touches relation tokens whose target equals the
//!   old title. Plain tags, config tokens and titles stay as they were.

use crate::model::item::{Item, ItemId};
use crate::tags::grammar::{join_tokens, parse_tags, split_tokens, Relation, TagToken};
use crate::tree::index::pre_order;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relation pointing at an item, seen from the target side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingRelation {
    pub relation: String,
    pub source_title: String,
    pub source_id: ItemId,
}

/// Relations declared by `item` itself.
pub fn outgoing_of(item: &Item) -> Vec<Relation> {
    parse_tags(&item.tags).relations
}

/// Relations from every other item whose target equals `item.title`.
pub fn incoming_of(items: &[Item], item: &Item) -> Vec<IncomingRelation> {
    incoming_for_title(items, &item.title, Some(item.id.as_str()))
}

/// Relations targeting `title`, optionally skipping the item `exclude_id`.
pub fn incoming_for_title(
    items: &[Item],
    title: &str,
    exclude_id: Option<&str>,
) -> Vec<IncomingRelation> {
    let mut incoming = Vec::new();
    for (source, _) in pre_order(items) {
        if exclude_id == Some(source.id.as_str()) {
            continue;
        }
        for relation in outgoing_of(source) {
            if relation.target == title {
                incoming.push(IncomingRelation {
                    relation: relation.relation,
                    source_title: source.title.clone(),
                    source_id: source.id.clone(),
                });
            }
        }
    }
    incoming
}

/// Builds the incoming relation lists of every target title in one pass.
pub fn incoming_map(items: &[Item]) -> HashMap<String, Vec<IncomingRelation>> {
    let mut map: HashMap<String, Vec<IncomingRelation>> = HashMap::new();
    for (source, _) in pre_order(items) {
        for relation in outgoing_of(source) {
            map.entry(relation.target).or_default().push(IncomingRelation {
                relation: relation.relation,
                source_title: source.title.clone(),
                source_id: source.id.clone(),
            });
        }
    }
    map
}

/// Counts relation tokens targeting `title` across the tree.
pub fn count_relations_to(items: &[Item], title: &str) -> usize {
    pre_order(items)
        .map(|(item, _)| {
            outgoing_of(item)
                .iter()
                .filter(|relation| relation.target == title)
                .count()
        })
        .sum()
}

/// Rewrites every relation targeting `old_title` to target `new_title`.
///
/// Returns the number of relation tokens rewritten. Items without a matching
/// token keep their tag string byte-for-byte.
pub fn propagate_rename(items: &mut [Item], old_title: &str, new_title: &str) -> usize {
    if old_title == new_title {
        return 0;
    }
    let mut rewritten = 0;
    for item in items.iter_mut() {
        rewritten += rewrite_item_targets(item, old_title, new_title);
        rewritten += propagate_rename(&mut item.items, old_title, new_title);
    }
    rewritten
}

fn rewrite_item_targets(item: &mut Item, old_title: &str, new_title: &str) -> usize {
    let mut rewritten = 0;
    let tokens: Vec<String> = split_tokens(&item.tags)
        .into_iter()
        .map(|token| match TagToken::classify(&token) {
            TagToken::Relation(relation) if relation.target == old_title => {
                rewritten += 1;
                Relation::new(relation.relation, new_title).to_token()
            }
            _ => token,
        })
        .collect();
    if rewritten > 0 {
        item.tags = join_tokens(&tokens);
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::{incoming_map, propagate_rename};
    use crate::model::item::Item;

    #[test]
    fn rename_leaves_untouched_items_byte_identical() {
        let mut tree = vec![
            Item::with_id("1", "A", "", "x ,  high>>Old"),
            Item::with_id("2", "B", "", "  spaced ,low>>Other  "),
        ];
        assert_eq!(propagate_rename(&mut tree, "Old", "New"), 1);
        assert_eq!(tree[0].tags, "x, high>>New");
        assert_eq!(tree[1].tags, "  spaced ,low>>Other  ");
    }

    #[test]
    fn incoming_map_groups_by_target() {
        let tree = vec![
            Item::with_id("1", "A", "", "high>>T, low>>U"),
            Item::with_id("2", "B", "", "medium>>T"),
        ];
        let map = incoming_map(&tree);
        assert_eq!(map["T"].len(), 2);
        assert_eq!(map["U"][0].source_id, "1");
    }
}
