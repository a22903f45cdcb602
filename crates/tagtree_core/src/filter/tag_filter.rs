//! Tag-predicate tree filtering.
//!
//! # Responsibility
//! - Select items whose plain tags satisfy an AND/OR predicate.
//! - Keep every ancestor of a match so the result stays connected to roots.
//!
//! # Invariants
//! - Only plain tags take part in matching; `type::`, relation and matrix
//!   config tokens never match.
//! - The result is a structural copy; the input tree is never mutated.
//! - Pass one marks kept nodes, pass two clones them. Both run over one
//!   flattened pre-order with explicit slot indices, so both are O(n).

use crate::model::item::Item;
use crate::tags::grammar::parse_tags;
use crate::tree::index::pre_order;
use std::collections::BTreeSet;

/// Sentinel tag that disables filtering.
pub const ALL_TAGS: &str = "all";

/// How several active tags combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Item must carry every active tag.
    And,
    /// Item must carry at least one active tag.
    #[default]
    Or,
}

impl FilterMode {
    /// Parses `and`/`or`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

/// Returns whether `item`'s plain tags satisfy the predicate.
pub fn item_matches(item: &Item, active_tags: &[String], mode: FilterMode) -> bool {
    let parsed = parse_tags(&item.tags);
    match mode {
        FilterMode::And => active_tags.iter().all(|tag| parsed.has_plain(tag.trim())),
        FilterMode::Or => active_tags.iter().any(|tag| parsed.has_plain(tag.trim())),
    }
}

/// Filters the tree, preserving ancestors of every match.
///
/// With `include_descendants`, a matching item is copied with its whole
/// subtree. Without it, only matches and their ancestors appear, so children
/// of a match that do not lead to another match are suppressed.
///
/// An empty tag list or the `all` sentinel returns an unchanged copy.
pub fn filter_tree(
    items: &[Item],
    active_tags: &[String],
    mode: FilterMode,
    include_descendants: bool,
) -> Vec<Item> {
    let active: Vec<String> = active_tags
        .iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    if active.is_empty() || active.iter().any(|tag| tag == ALL_TAGS) {
        return items.to_vec();
    }

    let marks = mark_kept(items, &active, mode);
    clone_kept(&marks, include_descendants)
}

/// Pre-order flattening of the tree. Parents always sit at a lower slot
/// than their children.
struct Marks<'a> {
    slots: Vec<(&'a Item, Option<usize>)>,
    matched: Vec<bool>,
    kept: Vec<bool>,
}

fn mark_kept<'a>(items: &'a [Item], active: &[String], mode: FilterMode) -> Marks<'a> {
    let mut slots: Vec<(&Item, Option<usize>)> = Vec::new();
    let mut stack: Vec<(&Item, Option<usize>)> =
        items.iter().rev().map(|item| (item, None)).collect();
    while let Some((item, parent)) = stack.pop() {
        let slot = slots.len();
        slots.push((item, parent));
        stack.extend(item.items.iter().rev().map(|child| (child, Some(slot))));
    }

    // Backwards sweep visits children before their parent.
    let mut matched = vec![false; slots.len()];
    let mut kept = vec![false; slots.len()];
    for slot in (0..slots.len()).rev() {
        let (item, parent) = slots[slot];
        if item_matches(item, active, mode) {
            matched[slot] = true;
            kept[slot] = true;
        }
        if kept[slot] {
            if let Some(parent) = parent {
                kept[parent] = true;
            }
        }
    }
    Marks {
        slots,
        matched,
        kept,
    }
}

fn clone_kept(marks: &Marks<'_>, include_descendants: bool) -> Vec<Item> {
    let len = marks.slots.len();

    // Slots already carried by a matched ancestor copied whole.
    let mut covered = vec![false; len];
    if include_descendants {
        for slot in 0..len {
            if let Some(parent) = marks.slots[slot].1 {
                covered[slot] = covered[parent] || marks.matched[parent];
            }
        }
    }

    let mut children: Vec<Vec<Item>> = vec![Vec::new(); len];
    let mut roots = Vec::new();
    for slot in (0..len).rev() {
        if !marks.kept[slot] || covered[slot] {
            continue;
        }
        let (item, parent) = marks.slots[slot];
        let node = if include_descendants && marks.matched[slot] {
            item.clone()
        } else {
            let mut items = std::mem::take(&mut children[slot]);
            items.reverse();
            Item {
                id: item.id.clone(),
                title: item.title.clone(),
                content: item.content.clone(),
                tags: item.tags.clone(),
                items,
            }
        };
        match parent {
            Some(parent) => children[parent].push(node),
            None => roots.push(node),
        }
    }
    roots.reverse();
    roots
}

/// Sorted, deduplicated plain tags used anywhere in the tree.
pub fn collect_plain_tags(items: &[Item]) -> BTreeSet<String> {
    pre_order(items)
        .flat_map(|(item, _)| parse_tags(&item.tags).plain)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{collect_plain_tags, filter_tree, FilterMode};
    use crate::model::item::Item;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn relation_and_type_tokens_never_match() {
        let tree = vec![Item::with_id("1", "A", "", "type::risk, risk>>B")];
        assert!(filter_tree(&tree, &tags(&["risk"]), FilterMode::Or, false).is_empty());
    }

    #[test]
    fn and_requires_every_tag() {
        let tree = vec![
            Item::with_id("1", "A", "", "x, y"),
            Item::with_id("2", "B", "", "x"),
        ];
        let result = filter_tree(&tree, &tags(&["x", "y"]), FilterMode::And, false);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn empty_tag_list_returns_copy() {
        let tree = vec![Item::with_id("1", "A", "", "")];
        assert_eq!(filter_tree(&tree, &[], FilterMode::Or, false), tree);
    }

    #[test]
    fn sibling_order_survives_filtering() {
        let tree = vec![
            Item::with_id("1", "A", "", "").with_children([
                Item::with_id("1a", "A1", "", "x"),
                Item::with_id("1b", "A2", "", ""),
                Item::with_id("1c", "A3", "", "x")
                    .with_children([Item::with_id("1c1", "A31", "", "x")]),
            ]),
            Item::with_id("2", "B", "", "x"),
        ];
        let result = filter_tree(&tree, &tags(&["x"]), FilterMode::Or, false);
        let ids: Vec<_> = result.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        let children: Vec<_> = result[0].items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(children, vec!["1a", "1c"]);
        assert_eq!(result[0].items[1].items[0].id, "1c1");

        let whole = filter_tree(&tree, &tags(&["x"]), FilterMode::Or, true);
        assert_eq!(whole[0].items[1], tree[0].items[2]);
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(FilterMode::parse("AND"), Some(FilterMode::And));
        assert_eq!(FilterMode::parse(" or "), Some(FilterMode::Or));
        assert_eq!(FilterMode::parse("xor"), None);
    }

    #[test]
    fn plain_tag_vocabulary_is_sorted_and_unique() {
        let tree = vec![Item::with_id("1", "A", "", "b, a, type::x")
            .with_children([Item::with_id("2", "B", "", "a, c>>A")])];
        let collected: Vec<_> = collect_plain_tags(&tree).into_iter().collect();
        assert_eq!(collected, vec!["a".to_string(), "b".to_string()]);
    }
}
