//! Repository layer over persistent document stores.
//!
//! # Responsibility
//! - Own the tag and note collections and their id invariants.
//! - Isolate document storage details from service orchestration.
//!
//! # Invariants
//! - Ids are unique within each collection after `open`.
//! - Every mutation is persisted before it becomes visible to readers.

use crate::store::StoreError;
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;
pub mod tag_registry;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for tag/note collection operations.
#[derive(Debug)]
pub enum RepoError {
    /// Persistence-layer failure.
    Store(StoreError),
    /// Insert would break id uniqueness.
    DuplicateId { collection: &'static str, id: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::DuplicateId { collection, id } => {
                write!(f, "duplicate {collection} id: `{id}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::DuplicateId { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Drops later entries whose id was already seen, keeping first-wins order.
///
/// Returns `None` when the input is already unique.
pub(crate) fn dedupe_by_id<T: Clone>(
    collection: &'static str,
    items: &[T],
    id_of: impl Fn(&T) -> &str,
) -> Option<Vec<T>> {
    let mut seen = HashSet::with_capacity(items.len());
    let unique: Vec<T> = items
        .iter()
        .filter(|item| seen.insert(id_of(*item).to_string()))
        .cloned()
        .collect();

    if unique.len() == items.len() {
        return None;
    }

    warn!(
        "event=dedupe_ids module=repo status=warn collection={} dropped={}",
        collection,
        items.len() - unique.len()
    );
    Some(unique)
}
