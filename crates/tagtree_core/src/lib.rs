//! Core engine for tagged item trees.
//! Parses the tag grammar, resolves relations, filters trees and projects
//! relation matrices. All I/O and rendering live with the callers.

pub mod filter;
pub mod graph;
pub mod logging;
pub mod matrix;
pub mod model;
pub mod service;
pub mod tags;
pub mod tree;

pub use filter::tag_filter::{collect_plain_tags, filter_tree, item_matches, FilterMode, ALL_TAGS};
pub use graph::relation_index::RelationIndex;
pub use graph::relations::{
    count_relations_to, incoming_for_title, incoming_map, incoming_of, outgoing_of,
    propagate_rename, IncomingRelation,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use matrix::projector::{
    build_matrix, build_matrix_from_config, commit_matrix, AxisEntry, Matrix,
    MatrixCommitSummary, MatrixError, MatrixProjector, MatrixResult,
};
pub use model::document::{Document, DocumentError, DocumentResult};
pub use model::item::{new_item_id, Item, ItemId};
pub use service::document_service::{
    Confirmation, ConfirmationPrompt, DocumentService, DocumentServiceError,
    DocumentServiceResult, Proposal, RenameOutcome,
};
pub use tags::grammar::{
    fits_single_token, join_tokens, parse_tags, serialize_tags, split_tokens, MatrixConfig,
    ParsedTags, Relation, TagToken,
};
pub use tags::strength::{color_class_of, strength_of, Polarity, Strength};
pub use tree::index::{
    find_by_id, find_by_id_mut, find_by_title, find_id_by_title, find_parent, insert,
    move_within_parent, pre_order, remove, walk,
};
pub use tree::title_index::{DuplicateTitle, TitleIndex};

/// Minimal health-check API for collaborator wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
