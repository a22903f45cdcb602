//! Document data model.
//!
//! # Responsibility
//! - Define the item tree and its document envelope.
//! - Keep the tag string as the single persisted source of derived facts.
//!
//! # Invariants
//! - Every item is identified by an opaque id that is never reused.
//! - Titles are assumed unique but not enforced; see `tree::title_index`.

pub mod document;
pub mod item;
