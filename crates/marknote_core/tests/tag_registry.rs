use marknote_core::{MemoryKv, NotesService, NotesServiceError, StoreKeys, Tag, TagRegistry};
use std::collections::HashSet;

#[test]
fn mixed_tag_operations_keep_ids_unique_and_order_stable() {
    let kv = MemoryKv::new();
    let mut registry = TagRegistry::open(&kv, "TAGS").unwrap();

    let work = registry.add_tag("work").unwrap();
    let home = registry.add_tag("home").unwrap();
    let misc = registry.add_tag("misc").unwrap();
    assert!(registry.rename_tag(&home.id, "house").unwrap());
    assert!(registry.delete_tag(&work.id).unwrap());
    let later = registry.add_tag("later").unwrap();

    let listed = registry.list_tags();
    let ids: Vec<&str> = listed.iter().map(|tag| tag.id.as_str()).collect();
    assert_eq!(ids, vec![home.id.as_str(), misc.id.as_str(), later.id.as_str()]);
    assert_eq!(listed[0].label, "house");

    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn tag_changes_survive_reopen() {
    let kv = MemoryKv::new();
    let (kept_id, dropped_id) = {
        let mut registry = TagRegistry::open(&kv, "TAGS").unwrap();
        let kept = registry.add_tag("work").unwrap();
        let dropped = registry.add_tag("home").unwrap();
        registry.rename_tag(&kept.id, "job").unwrap();
        registry.delete_tag(&dropped.id).unwrap();
        (kept.id, dropped.id)
    };

    let reopened = TagRegistry::open(&kv, "TAGS").unwrap();
    assert_eq!(reopened.get_tag(&kept_id).unwrap().label, "job");
    assert!(reopened.get_tag(&dropped_id).is_none());
}

#[test]
fn rename_and_delete_of_unknown_id_are_silent_no_ops() {
    let kv = MemoryKv::new();
    let mut service = NotesService::open(&kv, &StoreKeys::default()).unwrap();
    service.add_tag("work").unwrap();
    let before = service.list_tags().to_vec();

    service.rename_tag("missing", "x").unwrap();
    service.delete_tag("missing").unwrap();
    assert_eq!(service.list_tags(), before.as_slice());
}

#[test]
fn blank_labels_are_stored_as_typed() {
    let kv = MemoryKv::new();
    let mut service = NotesService::open(&kv, &StoreKeys::default()).unwrap();

    let blank = service.add_tag("").unwrap();
    assert_eq!(blank.label, "");

    let tag = service.add_tag("work").unwrap();
    service.rename_tag(&tag.id, "  ").unwrap();
    let labels: Vec<&str> = service
        .list_tags()
        .iter()
        .map(|tag| tag.label.as_str())
        .collect();
    assert_eq!(labels, vec!["", "  "]);
}

#[test]
fn import_tag_keeps_caller_id_and_rejects_duplicates() {
    let kv = MemoryKv::new();
    let mut service = NotesService::open(&kv, &StoreKeys::default()).unwrap();

    let imported = service.import_tag(Tag::with_id("client-1", "work")).unwrap();
    assert_eq!(imported, Tag::with_id("client-1", "work"));

    let err = service
        .import_tag(Tag::with_id("client-1", "home"))
        .unwrap_err();
    match err {
        NotesServiceError::DuplicateId { collection, id } => {
            assert_eq!(collection, "tag");
            assert_eq!(id, "client-1");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.list_tags(), &[Tag::with_id("client-1", "work")]);

    let reopened = NotesService::open(&kv, &StoreKeys::default()).unwrap();
    assert_eq!(reopened.list_tags()[0].id, "client-1");
}

#[test]
fn rejected_write_surfaces_error_and_keeps_state() {
    let kv = MemoryKv::new();
    let mut service = NotesService::open(&kv, &StoreKeys::default()).unwrap();
    let tag = service.add_tag("work").unwrap();
    kv.set_reject_writes(true);

    let err = service.rename_tag(&tag.id, "job").unwrap_err();
    assert!(matches!(err, NotesServiceError::Store(_)));
    assert_eq!(service.list_tags()[0].label, "work");

    let err = service.add_tag("home").unwrap_err();
    assert!(matches!(err, NotesServiceError::Store(_)));
    assert_eq!(service.list_tags().len(), 1);
}
