//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the notes/tags contract to Dart via FRB.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the configured database, runs one use-case and closes
//!   it again; no state is cached between calls besides the resolved path.
//! - Calls within one process are serialized.

use log::warn;
use marknote_core::db::open_db;
use marknote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    filter_notes, Note, NotesService, SqliteKv, StoreKeys, Tag,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const DB_FILE_NAME: &str = "marknote.sqlite3";
const DB_PATH_ENV: &str = "MARKNOTE_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
// Each call is a load-modify-write of whole documents; callers take turns.
static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Tag as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagItem {
    pub id: String,
    pub label: String,
}

/// Joined note as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<TagItem>,
}

/// Envelope for tag listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsResponse {
    pub ok: bool,
    pub items: Vec<TagItem>,
    /// Human-readable diagnostics, including storage recovery notices.
    pub message: String,
}

/// Envelope for note listing and lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Envelope for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created entity, when the action created one.
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    /// Success envelope; a storage recovery `notice` is appended to
    /// `message` so the UI can surface it.
    fn success(message: &str, id: Option<String>, notice: Option<String>) -> Self {
        let message = match notice {
            Some(notice) => format!("{message} {notice}"),
            None => message.to_string(),
        };
        Self {
            ok: true,
            id,
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Lists all tags in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn tags_list() -> TagsResponse {
    match with_service(|service| {
        Ok(service
            .list_tags()
            .iter()
            .map(to_tag_item)
            .collect::<Vec<_>>())
    }) {
        Ok((items, notice)) => TagsResponse {
            ok: true,
            items,
            message: notice.unwrap_or_default(),
        },
        Err(err) => TagsResponse {
            ok: false,
            items: Vec::new(),
            message: format!("tags_list failed: {err}"),
        },
    }
}

/// Creates a tag; returns its generated id.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_add(label: String) -> ActionResponse {
    match with_service(|service| service.add_tag(label).map_err(|err| err.to_string())) {
        Ok((tag, notice)) => ActionResponse::success("Tag created.", Some(tag.id), notice),
        Err(err) => ActionResponse::failure(format!("tag_add failed: {err}")),
    }
}

/// Renames a tag; unknown ids succeed without effect.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_rename(id: String, label: String) -> ActionResponse {
    match with_service(|service| {
        service
            .rename_tag(id.as_str(), label)
            .map_err(|err| err.to_string())
    }) {
        Ok(((), notice)) => ActionResponse::success("Tag renamed.", None, notice),
        Err(err) => ActionResponse::failure(format!("tag_rename failed: {err}")),
    }
}

/// Deletes a tag; notes keep their references.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_delete(id: String) -> ActionResponse {
    match with_service(|service| service.delete_tag(id.as_str()).map_err(|err| err.to_string())) {
        Ok(((), notice)) => ActionResponse::success("Tag deleted.", None, notice),
        Err(err) => ActionResponse::failure(format!("tag_delete failed: {err}")),
    }
}

/// Stores a tag that already carries an id, e.g. one restored from a backup.
///
/// Fails when a tag with the same id exists.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_import(tag: TagItem) -> ActionResponse {
    let tag = from_tag_item(tag);
    match with_service(|service| service.import_tag(tag).map_err(|err| err.to_string())) {
        Ok((tag, notice)) => ActionResponse::success("Tag imported.", Some(tag.id), notice),
        Err(err) => ActionResponse::failure(format!("tag_import failed: {err}")),
    }
}

/// Creates a note tagged with `tags`; returns the new note id.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, markdown: String, tags: Vec<TagItem>) -> ActionResponse {
    let tags: Vec<Tag> = tags.into_iter().map(from_tag_item).collect();
    match with_service(|service| {
        service
            .create_note(title, markdown, tags)
            .map_err(|err| err.to_string())
    }) {
        Ok((note, notice)) => ActionResponse::success("Note created.", Some(note.id), notice),
        Err(err) => ActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Lists joined notes matching `title_query` and carrying every tag in
/// `selected_tags`. Empty inputs list everything.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(title_query: String, selected_tags: Vec<TagItem>) -> NotesResponse {
    let selected: Vec<Tag> = selected_tags.into_iter().map(from_tag_item).collect();
    let result = with_service(|service| {
        let joined = service.list_notes_joined();
        Ok(filter_notes(&joined, title_query.as_str(), &selected))
    });
    notes_response("notes_list", result)
}

/// Looks up one joined note; `items` is empty when the id is unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(id: String) -> NotesResponse {
    let result = with_service(|service| {
        Ok(service
            .get_note_joined(id.as_str())
            .into_iter()
            .collect::<Vec<_>>())
    });
    notes_response("note_get", result)
}

fn notes_response(
    operation: &str,
    result: Result<(Vec<Note>, Option<String>), String>,
) -> NotesResponse {
    match result {
        Ok((notes, notice)) => NotesResponse {
            ok: true,
            items: notes.into_iter().map(to_note_item).collect(),
            message: notice.unwrap_or_default(),
        },
        Err(err) => NotesResponse {
            ok: false,
            items: Vec::new(),
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn resolve_db_path() -> PathBuf {
    if let Some(path) = db_path_override() {
        return path;
    }
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

#[cfg(not(test))]
fn db_path_override() -> Option<PathBuf> {
    None
}

#[cfg(test)]
fn db_path_override() -> Option<PathBuf> {
    tests::TEST_DB_PATH.with(|path| path.borrow().clone())
}

/// Runs `f` against a freshly opened session.
///
/// The second tuple element carries a user-facing notice when a stored
/// collection was unreadable and has been reset.
fn with_service<T>(
    f: impl FnOnce(&mut NotesService<'_, SqliteKv<'_>>) -> Result<T, String>,
) -> Result<(T, Option<String>), String> {
    let _turn = SESSION_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let kv = SqliteKv::try_new(&conn).map_err(|err| format!("store init failed: {err}"))?;
    let mut service = NotesService::open(&kv, &StoreKeys::default())
        .map_err(|err| format!("store load failed: {err}"))?;

    let warnings = service.load_warnings();
    let notice = if warnings.is_empty() {
        None
    } else {
        let keys = warnings
            .iter()
            .map(|warning| warning.key.as_str())
            .collect::<Vec<_>>()
            .join(",");
        warn!("event=ffi_store_recovered module=ffi status=warn keys={keys}");
        Some(format!("Unreadable data was reset: {keys}."))
    };

    let value = f(&mut service)?;
    Ok((value, notice))
}

fn to_tag_item(tag: &Tag) -> TagItem {
    TagItem {
        id: tag.id.clone(),
        label: tag.label.clone(),
    }
}

fn from_tag_item(item: TagItem) -> Tag {
    Tag::with_id(item.id, item.label)
}

fn to_note_item(note: Note) -> NoteItem {
    NoteItem {
        id: note.id,
        title: note.title,
        markdown: note.markdown,
        tags: note.tags.iter().map(to_tag_item).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_create, note_get, notes_list, ping, tag_add,
        tag_delete, tag_import, tag_rename, tags_list, TagItem, DB_FILE_NAME,
    };
    use marknote_core::db::open_db;
    use marknote_core::{KvBackend, SqliteKv, StoreKeys};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    thread_local! {
        // Each test thread gets its own database file.
        pub(super) static TEST_DB_PATH: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
    }

    /// Points this thread's FFI calls at a fresh database under a temp dir.
    fn isolated_db() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE_NAME);
        TEST_DB_PATH.with(|slot| *slot.borrow_mut() = Some(path.clone()));
        (dir, path)
    }

    fn tag_item(id: &str, label: &str) -> TagItem {
        TagItem {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn tag_lifecycle_is_visible_in_listing() {
        let _db = isolated_db();
        let created = tag_add("work".to_string());
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.message, "Tag created.");
        let id = created.id.expect("tag_add should return id");

        assert!(tag_rename(id.clone(), "office".to_string()).ok);
        let listed = tags_list();
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items, vec![tag_item(&id, "office")]);

        assert!(tag_delete(id).ok);
        assert!(tags_list().items.is_empty());
    }

    #[test]
    fn tag_add_accepts_blank_label() {
        let _db = isolated_db();
        let response = tag_add("  ".to_string());
        assert!(response.ok, "{}", response.message);

        let listed = tags_list();
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].label, "  ");
    }

    #[test]
    fn tag_import_keeps_id_and_rejects_duplicates() {
        let _db = isolated_db();
        let imported = tag_import(tag_item("client-1", "client"));
        assert!(imported.ok, "{}", imported.message);
        assert_eq!(imported.id.as_deref(), Some("client-1"));

        let duplicate = tag_import(tag_item("client-1", "other"));
        assert!(!duplicate.ok);
        assert!(duplicate.message.contains("tag_import failed"));
        assert!(duplicate.message.contains("client-1"));

        assert_eq!(tags_list().items, vec![tag_item("client-1", "client")]);
    }

    #[test]
    fn write_reports_reset_of_unreadable_tags() {
        let (_dir, path) = isolated_db();
        {
            let conn = open_db(&path).unwrap();
            let kv = SqliteKv::try_new(&conn).unwrap();
            kv.write(&StoreKeys::default().tags, "{corrupt").unwrap();
        }

        let response = tag_add("work".to_string());
        assert!(response.ok, "{}", response.message);
        assert!(response.message.starts_with("Tag created."));
        assert!(response.message.contains("Unreadable data was reset: TAGS."));

        // The write replaced the corrupt document, so later calls are clean.
        let listed = tags_list();
        assert!(listed.message.is_empty(), "{}", listed.message);
        assert_eq!(listed.items.len(), 1);
    }

    #[test]
    fn created_note_is_found_by_title_and_tag() {
        let _db = isolated_db();
        let tag_response = tag_add("label".to_string());
        let tag = tag_item(&tag_response.id.expect("tag id"), "");
        let created = note_create(
            "Weekly Plan".to_string(),
            "*body*".to_string(),
            vec![tag.clone()],
        );
        assert!(created.ok, "{}", created.message);
        let note_id = created.id.expect("note id");
        assert!(note_create("Other".to_string(), String::new(), Vec::new()).ok);

        let found = notes_list("weekly".to_string(), vec![tag]);
        assert!(found.ok, "{}", found.message);
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].id, note_id);
        assert_eq!(found.items[0].markdown, "*body*");
        assert_eq!(found.items[0].tags[0].label, "label");

        assert_eq!(notes_list(String::new(), Vec::new()).items.len(), 2);
        assert_eq!(note_get(note_id).items.len(), 1);
        assert!(note_get("missing".to_string()).items.is_empty());
    }
}
