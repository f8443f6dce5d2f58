//! Tag registry backed by one persistent document.
//!
//! # Responsibility
//! - Create, rename and delete tags while keeping insertion order.
//!
//! # Invariants
//! - Tag ids are unique.
//! - Rename/delete of an unknown id is a silent no-op and writes nothing.
//! - Deleting a tag never touches notes; their references become dangling.

use crate::model::tag::Tag;
use crate::repo::{dedupe_by_id, RepoError, RepoResult};
use crate::store::{KvBackend, LoadWarning, PersistentStore, StoreResult};
use log::info;

const COLLECTION: &str = "tag";

/// Authoritative tag collection for one session.
pub struct TagRegistry<'b, B: KvBackend + ?Sized> {
    store: PersistentStore<'b, Vec<Tag>, B>,
}

impl<'b, B: KvBackend + ?Sized> TagRegistry<'b, B> {
    /// Loads the registry stored under `key`, starting empty on first use.
    pub fn open(backend: &'b B, key: &str) -> StoreResult<Self> {
        let mut store = PersistentStore::initialize(backend, key, Vec::new())?;
        if let Some(unique) = dedupe_by_id(COLLECTION, store.get(), |tag: &Tag| tag.id.as_str())
        {
            store.repair(unique);
        }
        Ok(Self { store })
    }

    /// Tags in insertion order.
    pub fn list_tags(&self) -> &[Tag] {
        self.store.get()
    }

    pub fn get_tag(&self, id: &str) -> Option<&Tag> {
        self.store.get().iter().find(|tag| tag.id == id)
    }

    /// Set when the stored document was unreadable and dropped.
    pub fn load_warning(&self) -> Option<&LoadWarning> {
        self.store.load_warning()
    }

    /// Creates a tag with a generated id and appends it.
    pub fn add_tag(&mut self, label: impl Into<String>) -> StoreResult<Tag> {
        let tag = Tag::new(label);
        let appended = tag.clone();
        self.store.update(|prev| {
            let mut next = prev.clone();
            next.push(appended);
            next
        })?;
        info!("event=tag_add module=repo status=ok tag_id={}", tag.id);
        Ok(tag)
    }

    /// Appends a caller-built tag, keeping its id.
    ///
    /// # Errors
    /// - `DuplicateId` when a tag with the same id exists.
    pub fn insert_tag(&mut self, tag: Tag) -> RepoResult<Tag> {
        if self.get_tag(&tag.id).is_some() {
            return Err(RepoError::DuplicateId {
                collection: COLLECTION,
                id: tag.id,
            });
        }
        let appended = tag.clone();
        self.store.update(|prev| {
            let mut next = prev.clone();
            next.push(appended);
            next
        })?;
        info!("event=tag_add module=repo status=ok tag_id={} source=import", tag.id);
        Ok(tag)
    }

    /// Replaces the label of tag `id`. Returns whether a tag matched.
    pub fn rename_tag(&mut self, id: &str, label: impl Into<String>) -> StoreResult<bool> {
        if self.get_tag(id).is_none() {
            return Ok(false);
        }
        let label = label.into();
        self.store.update(|prev| {
            prev.iter()
                .map(|tag| {
                    if tag.id == id {
                        Tag::with_id(tag.id.clone(), label.clone())
                    } else {
                        tag.clone()
                    }
                })
                .collect()
        })?;
        info!("event=tag_rename module=repo status=ok tag_id={id}");
        Ok(true)
    }

    /// Removes tag `id`. Returns whether a tag matched.
    pub fn delete_tag(&mut self, id: &str) -> StoreResult<bool> {
        if self.get_tag(id).is_none() {
            return Ok(false);
        }
        self.store
            .update(|prev| prev.iter().filter(|tag| tag.id != id).cloned().collect())?;
        info!("event=tag_delete module=repo status=ok tag_id={id}");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::TagRegistry;
    use crate::model::tag::Tag;
    use crate::repo::RepoError;
    use crate::store::MemoryKv;

    #[test]
    fn rename_unknown_id_does_not_write() {
        let kv = MemoryKv::new();
        let mut registry = TagRegistry::open(&kv, "TAGS").unwrap();
        registry.add_tag("work").unwrap();
        kv.set_reject_writes(true);

        assert!(!registry.rename_tag("missing", "x").unwrap());
        assert!(!registry.delete_tag("missing").unwrap());
    }

    #[test]
    fn insert_tag_rejects_duplicate_id() {
        let kv = MemoryKv::new();
        let mut registry = TagRegistry::open(&kv, "TAGS").unwrap();
        registry.insert_tag(Tag::with_id("1", "work")).unwrap();

        let err = registry.insert_tag(Tag::with_id("1", "home")).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateId { collection: "tag", .. }));
        assert_eq!(registry.list_tags().len(), 1);
    }

    #[test]
    fn open_drops_duplicate_ids_first_wins() {
        let kv = MemoryKv::new();
        kv.put_raw(
            "TAGS",
            r#"[{"id":"1","label":"work"},{"id":"1","label":"again"},{"id":"2","label":"home"}]"#,
        );

        let registry = TagRegistry::open(&kv, "TAGS").unwrap();
        let labels: Vec<&str> = registry
            .list_tags()
            .iter()
            .map(|tag| tag.label.as_str())
            .collect();
        assert_eq!(labels, vec!["work", "home"]);
    }

    #[test]
    fn open_serves_deduped_tags_when_medium_is_read_only() {
        let kv = MemoryKv::new();
        let stored = r#"[{"id":"1","label":"work"},{"id":"1","label":"again"}]"#;
        kv.put_raw("TAGS", stored);
        kv.set_reject_writes(true);

        let registry = TagRegistry::open(&kv, "TAGS").unwrap();
        assert_eq!(registry.list_tags(), &[Tag::with_id("1", "work")]);
        assert_eq!(kv.get_raw("TAGS").as_deref(), Some(stored));
    }
}
