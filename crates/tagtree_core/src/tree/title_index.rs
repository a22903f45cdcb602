//! Title to id index.
//!
//! # Responsibility
//! - Resolve titles to ids without rescanning the tree.
//! - Surface duplicate titles as validation warnings.
//!
//! # Invariants
//! - Ids per title are kept in pre-order, so `first_id` matches
//!   `index::find_id_by_title`.
//! - The index is a snapshot; rebuild it after any structural change or rename.

use crate::model::item::{Item, ItemId};
use crate::tree::index::pre_order;
use std::collections::BTreeMap;

/// Title shared by more than one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTitle {
    pub title: String,
    pub ids: Vec<ItemId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleIndex {
    by_title: BTreeMap<String, Vec<ItemId>>,
}

impl TitleIndex {
    pub fn build(items: &[Item]) -> Self {
        let mut by_title: BTreeMap<String, Vec<ItemId>> = BTreeMap::new();
        for (item, _) in pre_order(items) {
            by_title
                .entry(item.title.clone())
                .or_default()
                .push(item.id.clone());
        }
        Self { by_title }
    }

    /// First id carrying `title`, in pre-order.
    pub fn first_id(&self, title: &str) -> Option<&str> {
        self.by_title
            .get(title)
            .and_then(|ids| ids.first())
            .map(String::as_str)
    }

    /// All ids carrying `title`.
    pub fn ids(&self, title: &str) -> &[ItemId] {
        self.by_title.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, title: &str) -> bool {
        self.by_title.contains_key(title)
    }

    /// Titles carried by more than one item, sorted by title.
    pub fn duplicates(&self) -> Vec<DuplicateTitle> {
        self.by_title
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(title, ids)| DuplicateTitle {
                title: title.clone(),
                ids: ids.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::TitleIndex;
    use crate::model::item::Item;

    #[test]
    fn duplicates_are_reported_in_pre_order() {
        let tree = vec![
            Item::with_id("1", "Same", "", "")
                .with_children([Item::with_id("2", "Same", "", "")]),
            Item::with_id("3", "Other", "", ""),
        ];
        let index = TitleIndex::build(&tree);
        assert_eq!(index.first_id("Same"), Some("1"));
        let duplicates = index.duplicates();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].ids, vec!["1".to_string(), "2".to_string()]);
        assert!(index.ids("Missing").is_empty());
    }
}
