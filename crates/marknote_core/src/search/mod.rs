//! Note lookup entry points.
//!
//! # Responsibility
//! - Filter the joined note view by title and tags.

pub mod filter;
