//! Domain model for notes and tags.
//!
//! # Responsibility
//! - Define the persisted shapes (`Tag`, `RawNote`) and the joined read view.
//!
//! # Invariants
//! - Notes reference tags by id only; resolution happens on read.

pub mod note;
pub mod tag;
