//! Relation matrix projection between two subtrees.

pub mod projector;
