//! Document envelope and JSON I/O.
//!
//! # Responsibility
//! - Define the `{ title, items }` shape exchanged with collaborators.
//! - Load and save that shape as JSON without altering it.
//!
//! # Invariants
//! - Every item of a loaded document has a non-empty id.
//! - Save writes exactly the fields of `Item`; no derived facts are persisted.

use crate::model::item::{new_item_id, Item};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Result type for document I/O.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors from document load/save.
#[derive(Debug)]
pub enum DocumentError {
    /// File could not be read or written.
    Io(std::io::Error),
    /// Payload is not a valid document.
    Json(serde_json::Error),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "document io failed: {err}"),
            Self::Json(err) => write!(f, "invalid document json: {err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Whole document consumed and produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document title.
    #[serde(default)]
    pub title: String,
    /// Root items.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Document {
    /// Creates a document from a title and root items.
    pub fn new(title: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }

    /// Parses a JSON document and assigns ids to items that lack one.
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let mut document: Document = serde_json::from_str(json)?;
        document.assign_missing_ids();
        Ok(document)
    }

    /// Serializes the document as pretty JSON.
    pub fn to_json_pretty(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads and parses a JSON document from disk.
    pub fn load_from_path(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Writes the document to disk as pretty JSON.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Fills empty ids with generated ones. Returns how many were assigned.
    pub fn assign_missing_ids(&mut self) -> usize {
        let mut assigned = 0;
        let mut stack: Vec<&mut Item> = self.items.iter_mut().collect();
        while let Some(item) = stack.pop() {
            if item.id.trim().is_empty() {
                item.id = new_item_id();
                assigned += 1;
            }
            stack.extend(item.items.iter_mut());
        }
        assigned
    }
}
