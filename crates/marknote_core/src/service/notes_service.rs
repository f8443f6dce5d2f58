//! Notes use-case service.
//!
//! # Responsibility
//! - Expose the UI-facing contract: tag CRUD, note creation, joined listing
//!   and filtering.
//!
//! # Invariants
//! - Joined notes are recomputed from current state on every read.
//! - Rename/delete of an unknown tag id succeeds without effect.
//! - A failed write leaves the visible state unchanged and is returned.

use crate::model::note::{Note, NoteDraft};
use crate::model::tag::Tag;
use crate::repo::note_repo::{join_note, join_tags, NoteRepository};
use crate::repo::tag_registry::TagRegistry;
use crate::repo::RepoError;
use crate::search::filter::{filter_notes, NoteFilter};
use crate::store::{KvBackend, LoadWarning, StoreError, StoreKeys};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for notes use-cases.
#[derive(Debug)]
pub enum NotesServiceError {
    /// Insert collides with an existing id.
    DuplicateId { collection: &'static str, id: String },
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for NotesServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId { collection, id } => {
                write!(f, "{collection} id already exists: `{id}`")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotesServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for NotesServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RepoError> for NotesServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Store(err) => Self::Store(err),
            RepoError::DuplicateId { collection, id } => Self::DuplicateId { collection, id },
        }
    }
}

pub type NotesServiceResult<T> = Result<T, NotesServiceError>;

/// Session facade over the tag registry and note repository.
pub struct NotesService<'b, B: KvBackend + ?Sized> {
    tags: TagRegistry<'b, B>,
    notes: NoteRepository<'b, B>,
}

impl<'b, B: KvBackend + ?Sized> NotesService<'b, B> {
    /// Loads both collections from `backend` under `keys`.
    pub fn open(backend: &'b B, keys: &StoreKeys) -> NotesServiceResult<Self> {
        let tags = TagRegistry::open(backend, &keys.tags)?;
        let notes = NoteRepository::open(backend, &keys.notes)?;
        Ok(Self { tags, notes })
    }

    /// Warnings for collections whose stored documents were unreadable.
    pub fn load_warnings(&self) -> Vec<&LoadWarning> {
        [self.tags.load_warning(), self.notes.load_warning()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// All tags in insertion order.
    pub fn list_tags(&self) -> &[Tag] {
        self.tags.list_tags()
    }

    /// All notes with tags resolved, in creation order.
    pub fn list_notes_joined(&self) -> Vec<Note> {
        join_tags(self.notes.list_raw(), self.tags.list_tags())
    }

    /// One joined note by id.
    pub fn get_note_joined(&self, id: &str) -> Option<Note> {
        self.notes
            .get_note(id)
            .map(|raw| join_note(raw, self.tags.list_tags()))
    }

    /// Joined notes narrowed by `filter`.
    pub fn list_notes_filtered(&self, filter: &NoteFilter) -> Vec<Note> {
        filter.apply(&self.list_notes_joined())
    }

    /// Stores a new note referencing `tags` by id; returns its joined view.
    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        markdown: impl Into<String>,
        tags: Vec<Tag>,
    ) -> NotesServiceResult<Note> {
        let raw = self
            .notes
            .create_note(NoteDraft::new(title, markdown, tags))?;
        Ok(join_note(&raw, self.tags.list_tags()))
    }

    /// Creates a tag with a generated id. Any label is accepted as typed.
    pub fn add_tag(&mut self, label: impl Into<String>) -> NotesServiceResult<Tag> {
        Ok(self.tags.add_tag(label)?)
    }

    /// Adds a tag built by the caller, keeping its id.
    ///
    /// # Errors
    /// - `DuplicateId` when a tag with the same id exists.
    pub fn import_tag(&mut self, tag: Tag) -> NotesServiceResult<Tag> {
        Ok(self.tags.insert_tag(tag)?)
    }

    /// Renames tag `id`.
    ///
    /// Labels are stored as typed, including empty ones, so a label can be
    /// edited character by character.
    pub fn rename_tag(&mut self, id: &str, label: impl Into<String>) -> NotesServiceResult<()> {
        self.tags.rename_tag(id, label)?;
        Ok(())
    }

    /// Deletes tag `id`; notes keep their now-dangling references.
    pub fn delete_tag(&mut self, id: &str) -> NotesServiceResult<()> {
        self.tags.delete_tag(id)?;
        Ok(())
    }

    /// Filters an already-joined snapshot.
    pub fn filter_notes(
        &self,
        joined: &[Note],
        title_query: &str,
        selected_tags: &[Tag],
    ) -> Vec<Note> {
        filter_notes(joined, title_query, selected_tags)
    }
}
