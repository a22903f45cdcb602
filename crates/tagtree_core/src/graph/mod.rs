//! Relation graph derived from tag strings.

pub mod relation_index;
pub mod relations;
