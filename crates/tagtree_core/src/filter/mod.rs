//! Tree filtering by tag predicates.

pub mod tag_filter;
