//! Tag domain model.
//!
//! # Invariants
//! - `id` is opaque and unique within one tag registry.
//! - `label` is display-only and may change in place.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque tag identifier.
///
/// Generated ids are UUID v4 strings, but any string read back from storage
/// or supplied by an importer is accepted as-is.
pub type TagId = String;

/// User-facing label attached to notes by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    /// Creates a tag with a freshly generated id.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), label)
    }

    /// Creates a tag with a caller-provided id.
    pub fn with_id(id: impl Into<TagId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
