//! Item tree traversal and indexing.
//!
//! # Responsibility
//! - Provide generic lookups and in-place edits over owned item trees.
//! - Maintain the title to id index used by title-keyed relations.

pub mod index;
pub mod title_index;
