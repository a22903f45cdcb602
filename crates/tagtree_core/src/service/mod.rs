//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate engine calls into use-case level APIs.
//! - Keep UI collaborators decoupled from copy-on-write and index upkeep.

pub mod document_service;
