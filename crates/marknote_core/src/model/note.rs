//! Note domain model: stored and joined projections.
//!
//! # Responsibility
//! - Define the persisted `RawNote` shape (tags referenced by id).
//! - Define the read-side `Note` shape (tags resolved to entities).
//!
//! # Invariants
//! - `RawNote::tag_ids` are soft references; missing tags are not an error.
//! - `Note` is derived on read and never persisted.

use crate::model::tag::{Tag, TagId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque note identifier.
pub type NoteId = String;

/// Stored note form.
///
/// Serialized with camelCase keys so persisted documents keep the `tagIds`
/// field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNote {
    pub id: NoteId,
    pub title: String,
    /// Markdown source, stored verbatim.
    pub markdown: String,
    /// Ordered tag references. Duplicates are tolerated.
    pub tag_ids: Vec<TagId>,
}

/// Note with tag ids resolved against the current tag registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

/// Creation input: the UI hands over full tag entities from its selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, markdown: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tags,
        }
    }
}

impl RawNote {
    /// Builds a stored note from a draft, generating a fresh id and keeping
    /// only tag ids.
    pub fn from_draft(draft: NoteDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            markdown: draft.markdown,
            tag_ids: draft.tags.into_iter().map(|tag| tag.id).collect(),
        }
    }
}
