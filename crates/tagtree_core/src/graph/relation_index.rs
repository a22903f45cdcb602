//! Cached relation index for one loaded document.
//!
//! # Responsibility
//! - Parse each item's tag string once and keep the result by item id.
//! - Answer outgoing/incoming queries without rescanning tag strings.
//!
//! # Invariants
//! - `refresh_item` must be called after a tag or title edit of that item.
//! - `rebuild` must be called after any structural change (insert, remove,
//!   import) so the cache never holds ids that left the tree.

use crate::graph::relations::IncomingRelation;
use crate::model::item::{Item, ItemId};
use crate::tags::grammar::{parse_tags, ParsedTags, Relation};
use crate::tree::index::{find_by_id, pre_order};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CachedItem {
    title: String,
    parsed: ParsedTags,
}

#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    items: HashMap<ItemId, CachedItem>,
    // Pre-order position, so incoming lists come out in tree order.
    order: Vec<ItemId>,
}

impl RelationIndex {
    pub fn build(items: &[Item]) -> Self {
        let mut index = Self::default();
        index.rebuild(items);
        index
    }

    /// Drops the cache and parses every item again.
    pub fn rebuild(&mut self, items: &[Item]) {
        self.items.clear();
        self.order.clear();
        for (item, _) in pre_order(items) {
            self.order.push(item.id.clone());
            self.items.insert(item.id.clone(), cache_entry(item));
        }
    }

    /// Re-parses one item after its tags or title changed.
    ///
    /// Returns `false` when the item is not in `items` or was never indexed;
    /// callers should `rebuild` in that case.
    pub fn refresh_item(&mut self, items: &[Item], id: &str) -> bool {
        let Some(item) = find_by_id(items, id) else {
            return false;
        };
        match self.items.get_mut(id) {
            Some(cached) => {
                *cached = cache_entry(item);
                true
            }
            None => false,
        }
    }

    pub fn parsed(&self, id: &str) -> Option<&ParsedTags> {
        self.items.get(id).map(|cached| &cached.parsed)
    }

    pub fn outgoing(&self, id: &str) -> &[Relation] {
        self.parsed(id)
            .map(|parsed| parsed.relations.as_slice())
            .unwrap_or(&[])
    }

    /// Incoming relations for `title`, in tree order, skipping `exclude_id`.
    pub fn incoming(&self, title: &str, exclude_id: Option<&str>) -> Vec<IncomingRelation> {
        let mut incoming = Vec::new();
        for id in &self.order {
            if exclude_id == Some(id.as_str()) {
                continue;
            }
            let Some(cached) = self.items.get(id) else {
                continue;
            };
            for relation in &cached.parsed.relations {
                if relation.target == title {
                    incoming.push(IncomingRelation {
                        relation: relation.relation.clone(),
                        source_title: cached.title.clone(),
                        source_id: id.clone(),
                    });
                }
            }
        }
        incoming
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn cache_entry(item: &Item) -> CachedItem {
    CachedItem {
        title: item.title.clone(),
        parsed: parse_tags(&item.tags),
    }
}
