//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `marknote_core` linkage and storage bootstrap without the UI.

use marknote_core::db::open_db_in_memory;
use marknote_core::{NotesService, SqliteKv, StoreKeys};

fn main() {
    println!("marknote_core ping={}", marknote_core::ping());
    println!("marknote_core version={}", marknote_core::core_version());

    let status = open_db_in_memory()
        .map_err(|err| err.to_string())
        .and_then(|conn| {
            let kv = SqliteKv::try_new(&conn).map_err(|err| err.to_string())?;
            let service =
                NotesService::open(&kv, &StoreKeys::default()).map_err(|err| err.to_string())?;
            Ok(service.list_notes_joined().len())
        });
    match status {
        Ok(count) => println!("marknote_core store=ok notes={count}"),
        Err(err) => println!("marknote_core store=error error={err}"),
    }
}
