//! Core domain logic for marknote.
//! This crate is the single source of truth for note/tag invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::note::{Note, NoteDraft, NoteId, RawNote};
pub use model::tag::{Tag, TagId};
pub use repo::note_repo::{join_note, join_tags, NoteRepository};
pub use repo::tag_registry::TagRegistry;
pub use repo::{RepoError, RepoResult};
pub use search::filter::{filter_notes, NoteFilter};
pub use service::notes_service::{NotesService, NotesServiceError, NotesServiceResult};
pub use store::{
    KvBackend, LoadWarning, MemoryKv, PersistentStore, SqliteKv, StoreError, StoreKeys,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
