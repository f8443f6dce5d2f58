//! Note repository and tag join.
//!
//! # Responsibility
//! - Append new notes to the persisted note collection.
//! - Resolve stored tag references into the joined `Note` view.
//!
//! # Invariants
//! - Note ids are unique.
//! - Notes are immutable once created.
//! - Joined tags follow registry order, appear at most once, and silently
//!   skip ids that no longer resolve.

use crate::model::note::{Note, NoteDraft, RawNote};
use crate::model::tag::Tag;
use crate::repo::dedupe_by_id;
use crate::store::{KvBackend, LoadWarning, PersistentStore, StoreResult};
use log::info;
use std::collections::HashMap;

const COLLECTION: &str = "note";

/// Persisted raw note collection for one session.
pub struct NoteRepository<'b, B: KvBackend + ?Sized> {
    store: PersistentStore<'b, Vec<RawNote>, B>,
}

impl<'b, B: KvBackend + ?Sized> NoteRepository<'b, B> {
    /// Loads the notes stored under `key`, starting empty on first use.
    pub fn open(backend: &'b B, key: &str) -> StoreResult<Self> {
        let mut store = PersistentStore::initialize(backend, key, Vec::new())?;
        if let Some(unique) =
            dedupe_by_id(COLLECTION, store.get(), |note: &RawNote| note.id.as_str())
        {
            store.repair(unique);
        }
        Ok(Self { store })
    }

    /// Raw notes in creation order.
    pub fn list_raw(&self) -> &[RawNote] {
        self.store.get()
    }

    pub fn get_note(&self, id: &str) -> Option<&RawNote> {
        self.store.get().iter().find(|note| note.id == id)
    }

    pub fn load_warning(&self) -> Option<&LoadWarning> {
        self.store.load_warning()
    }

    /// Stores a new note built from `draft` and returns it.
    ///
    /// Ids are fresh UUID v4 values, so uniqueness is not re-checked here.
    ///
    /// # Errors
    /// - Persistence failure; the note is not kept in that case.
    pub fn create_note(&mut self, draft: NoteDraft) -> StoreResult<RawNote> {
        let note = RawNote::from_draft(draft);
        let appended = note.clone();
        self.store.update(|prev| {
            let mut next = prev.clone();
            next.push(appended);
            next
        })?;
        info!(
            "event=note_create module=repo status=ok note_id={} tag_count={}",
            note.id,
            note.tag_ids.len()
        );
        Ok(note)
    }
}

/// Resolves every note's tag ids against `tags`.
pub fn join_tags(raw_notes: &[RawNote], tags: &[Tag]) -> Vec<Note> {
    let index = TagIndex::new(tags);
    raw_notes.iter().map(|raw| index.join(raw)).collect()
}

/// Resolves one note's tag ids against `tags`.
pub fn join_note(raw: &RawNote, tags: &[Tag]) -> Note {
    TagIndex::new(tags).join(raw)
}

struct TagIndex<'t> {
    by_id: HashMap<&'t str, (usize, &'t Tag)>,
}

impl<'t> TagIndex<'t> {
    fn new(tags: &'t [Tag]) -> Self {
        let by_id = tags
            .iter()
            .enumerate()
            .map(|(position, tag)| (tag.id.as_str(), (position, tag)))
            .collect();
        Self { by_id }
    }

    fn join(&self, raw: &RawNote) -> Note {
        let mut resolved: Vec<(usize, &Tag)> = raw
            .tag_ids
            .iter()
            .filter_map(|id| self.by_id.get(id.as_str()).copied())
            .collect();
        resolved.sort_unstable_by_key(|(position, _)| *position);
        resolved.dedup_by_key(|(position, _)| *position);

        Note {
            id: raw.id.clone(),
            title: raw.title.clone(),
            markdown: raw.markdown.clone(),
            tags: resolved.into_iter().map(|(_, tag)| tag.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{join_note, join_tags};
    use crate::model::note::RawNote;
    use crate::model::tag::Tag;

    fn raw(id: &str, tag_ids: &[&str]) -> RawNote {
        RawNote {
            id: id.to_string(),
            title: format!("title {id}"),
            markdown: String::new(),
            tag_ids: tag_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn join_follows_registry_order_and_collapses_repeats() {
        let tags = vec![
            Tag::with_id("a", "alpha"),
            Tag::with_id("b", "beta"),
            Tag::with_id("c", "gamma"),
        ];
        let note = join_note(&raw("n1", &["c", "a", "c"]), &tags);

        let ids: Vec<&str> = note.tags.iter().map(|tag| tag.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn join_drops_dangling_ids() {
        let tags = vec![Tag::with_id("a", "alpha")];
        let joined = join_tags(&[raw("n1", &["gone", "a"]), raw("n2", &["gone"])], &tags);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].tags, vec![Tag::with_id("a", "alpha")]);
        assert!(joined[1].tags.is_empty());
    }
}
