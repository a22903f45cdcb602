//! Recursive helpers over the item tree.
//!
//! # Responsibility
//! - Locate items by id or title and resolve parents.
//! - Insert, remove and reorder items in an owned tree.
//!
//! # Invariants
//! - Lookups return the first pre-order match.
//! - Mutating helpers only run on a tree the caller owns (a clone of the
//!   live document); they mutate that clone in place.
//! - Read traversals use an explicit stack, so depth is bounded by heap only.

use crate::model::item::Item;

/// Pre-order iterator yielding `(item, depth)` pairs. Roots have depth 0.
pub struct PreOrder<'a> {
    stack: Vec<(&'a Item, usize)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (&'a Item, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (item, depth) = self.stack.pop()?;
        self.stack
            .extend(item.items.iter().rev().map(|child| (child, depth + 1)));
        Some((item, depth))
    }
}

/// Returns a pre-order traversal over `items` and all their descendants.
pub fn pre_order(items: &[Item]) -> PreOrder<'_> {
    PreOrder {
        stack: items.iter().rev().map(|item| (item, 0)).collect(),
    }
}

/// Visits every item depth-first, in pre-order.
pub fn walk<'a>(items: &'a [Item], mut visit: impl FnMut(&'a Item, usize)) {
    for (item, depth) in pre_order(items) {
        visit(item, depth);
    }
}

/// Counts every item in the tree.
pub fn count_items(items: &[Item]) -> usize {
    pre_order(items).count()
}

pub fn find_by_id<'a>(items: &'a [Item], id: &str) -> Option<&'a Item> {
    pre_order(items)
        .map(|(item, _)| item)
        .find(|item| item.id == id)
}

pub fn find_by_id_mut<'a>(items: &'a mut [Item], id: &str) -> Option<&'a mut Item> {
    for item in items.iter_mut() {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find_by_id_mut(&mut item.items, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_by_title<'a>(items: &'a [Item], title: &str) -> Option<&'a Item> {
    pre_order(items)
        .map(|(item, _)| item)
        .find(|item| item.title == title)
}

pub fn find_id_by_title<'a>(items: &'a [Item], title: &str) -> Option<&'a str> {
    find_by_title(items, title).map(|item| item.id.as_str())
}

/// Returns the direct parent of `id`, or `None` for roots and unknown ids.
pub fn find_parent<'a>(items: &'a [Item], id: &str) -> Option<&'a Item> {
    pre_order(items)
        .map(|(item, _)| item)
        .find(|item| item.items.iter().any(|child| child.id == id))
}

/// Appends `new_item` as the last child of `parent_id`, or as a new root.
///
/// Returns `false` when `parent_id` is given but not found.
pub fn insert(items: &mut Vec<Item>, new_item: Item, parent_id: Option<&str>) -> bool {
    match parent_id {
        None => {
            items.push(new_item);
            true
        }
        Some(parent_id) => match find_by_id_mut(items, parent_id) {
            Some(parent) => {
                parent.items.push(new_item);
                true
            }
            None => false,
        },
    }
}

/// Removes the first node matching `id` wherever it is.
pub fn remove(items: &mut Vec<Item>, id: &str) -> bool {
    take(items, id).is_some()
}

/// Removes and returns the first node matching `id`, with its subtree.
pub fn take(items: &mut Vec<Item>, id: &str) -> Option<Item> {
    if let Some(index) = items.iter().position(|item| item.id == id) {
        return Some(items.remove(index));
    }
    items.iter_mut().find_map(|item| take(&mut item.items, id))
}

/// Moves `id` to `target_index` among its siblings.
///
/// The index is clamped to the sibling range. Returns `false` when `id` is
/// not found.
pub fn move_within_parent(items: &mut Vec<Item>, id: &str, target_index: usize) -> bool {
    let Some(siblings) = siblings_of_mut(items, id) else {
        return false;
    };
    let Some(current) = siblings.iter().position(|item| item.id == id) else {
        return false;
    };
    let moved = siblings.remove(current);
    let target = target_index.min(siblings.len());
    siblings.insert(target, moved);
    true
}

/// Returns the position of `id` among its siblings.
pub fn sibling_index(items: &[Item], id: &str) -> Option<usize> {
    if let Some(index) = items.iter().position(|item| item.id == id) {
        return Some(index);
    }
    find_parent(items, id).and_then(|parent| parent.items.iter().position(|item| item.id == id))
}

fn siblings_of_mut<'a>(items: &'a mut Vec<Item>, id: &str) -> Option<&'a mut Vec<Item>> {
    if items.iter().any(|item| item.id == id) {
        return Some(items);
    }
    for item in items.iter_mut() {
        if let Some(found) = siblings_of_mut(&mut item.items, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{count_items, find_parent, move_within_parent, pre_order, take, walk};
    use crate::model::item::Item;

    fn sample() -> Vec<Item> {
        vec![
            Item::with_id("a", "A", "", "").with_children([
                Item::with_id("a1", "A1", "", ""),
                Item::with_id("a2", "A2", "", ""),
            ]),
            Item::with_id("b", "B", "", ""),
        ]
    }

    #[test]
    fn pre_order_visits_parent_before_children() {
        let tree = sample();
        let order: Vec<_> = pre_order(&tree)
            .map(|(item, depth)| (item.id.as_str(), depth))
            .collect();
        assert_eq!(order, vec![("a", 0), ("a1", 1), ("a2", 1), ("b", 0)]);
    }

    #[test]
    fn walk_reports_depth_for_every_item() {
        let tree = sample();
        let mut max_depth = 0;
        walk(&tree, |_, depth| max_depth = max_depth.max(depth));
        assert_eq!(max_depth, 1);
        assert_eq!(count_items(&tree), 4);
    }

    #[test]
    fn find_parent_is_none_for_roots() {
        let tree = sample();
        assert!(find_parent(&tree, "a").is_none());
        assert_eq!(find_parent(&tree, "a2").map(|item| item.id.as_str()), Some("a"));
    }

    #[test]
    fn take_returns_subtree() {
        let mut tree = sample();
        let taken = take(&mut tree, "a").expect("a should be removed");
        assert_eq!(taken.items.len(), 2);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn move_within_parent_clamps_index() {
        let mut tree = sample();
        assert!(move_within_parent(&mut tree, "a1", 99));
        let ids: Vec<_> = tree[0].items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);
        assert!(!move_within_parent(&mut tree, "missing", 0));
    }
}
