//! Item domain model.
//!
//! # Responsibility
//! - Define the tree node shared by every engine component.
//! - Provide constructors that assign fresh, never-reused ids.
//!
//! # Invariants
//! - `id` is opaque and unique within a document; it is never reused.
//! - `title` is the de facto foreign key for relations and matrix configs.
//! - `tags` is the only persisted form of plain tags, type, relations and
//!   matrix config. Everything else is derived on demand.
//! - `items` keeps insertion order; sibling order is significant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque item identifier.
///
/// Kept as a plain string so imported documents can carry ids that were not
/// generated by this crate.
pub type ItemId = String;

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier. Empty only for freshly imported items before
    /// `Document::assign_missing_ids` runs.
    #[serde(default)]
    pub id: ItemId,
    /// User-facing title, referenced by relation targets.
    pub title: String,
    /// Free-text body.
    #[serde(default)]
    pub content: String,
    /// Comma-separated tag string.
    #[serde(default)]
    pub tags: String,
    /// Ordered children.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Item {
    /// Creates an item with a generated id and no children.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self::with_id(new_item_id(), title, content, tags)
    }

    /// Creates an item with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            tags: tags.into(),
            items: Vec::new(),
        }
    }

    /// Builder-style helper that appends children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(children);
        self
    }

    /// Returns whether this item has at least one child.
    pub fn has_children(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Generates a new opaque item id.
pub fn new_item_id() -> ItemId {
    Uuid::new_v4().to_string()
}
