//! In-memory note filter over the joined view.
//!
//! # Responsibility
//! - Narrow joined notes by title substring and required tags.
//!
//! # Invariants
//! - Output keeps input order; nothing is re-sorted.
//! - Empty query and empty tag selection match every note.
//! - Title matching is case-insensitive; tag matching compares ids only.

use crate::model::note::Note;
use crate::model::tag::Tag;

/// Title query plus required tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub title_query: String,
    pub selected_tags: Vec<Tag>,
}

impl NoteFilter {
    pub fn new(title_query: impl Into<String>, selected_tags: Vec<Tag>) -> Self {
        Self {
            title_query: title_query.into(),
            selected_tags,
        }
    }

    /// Whether this filter lets every note through.
    pub fn is_empty(&self) -> bool {
        self.title_query.is_empty() && self.selected_tags.is_empty()
    }

    pub fn matches(&self, note: &Note) -> bool {
        self.compile().matches(note)
    }

    /// Applies this filter to `notes`, preserving order.
    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        if self.is_empty() {
            return notes.to_vec();
        }
        let compiled = self.compile();
        notes
            .iter()
            .filter(|note| compiled.matches(note))
            .cloned()
            .collect()
    }

    fn compile(&self) -> CompiledFilter<'_> {
        CompiledFilter {
            needle: self.title_query.to_lowercase(),
            selected_tags: &self.selected_tags,
        }
    }
}

struct CompiledFilter<'f> {
    needle: String,
    selected_tags: &'f [Tag],
}

impl CompiledFilter<'_> {
    fn matches(&self, note: &Note) -> bool {
        let title_ok = self.needle.is_empty() || note.title.to_lowercase().contains(&self.needle);
        let tags_ok = self
            .selected_tags
            .iter()
            .all(|wanted| note.tags.iter().any(|tag| tag.id == wanted.id));
        title_ok && tags_ok
    }
}

/// Returns the notes matching `title_query` and carrying all `selected_tags`.
pub fn filter_notes(joined: &[Note], title_query: &str, selected_tags: &[Tag]) -> Vec<Note> {
    NoteFilter::new(title_query, selected_tags.to_vec()).apply(joined)
}
