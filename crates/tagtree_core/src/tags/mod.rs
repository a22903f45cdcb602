//! Tag string language.
//!
//! # Responsibility
//! - Parse and serialize the comma-separated tag grammar.
//! - Resolve relation labels into strength and polarity.

pub mod grammar;
pub mod strength;
