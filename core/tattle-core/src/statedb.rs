//! Read-only key-value state store reader.
//!
//! Editor-family applications persist session state in an embedded sqlite
//! database with an `ItemTable` key/value schema. The editor heuristic
//! consults it as a last resort when accessibility introspection is
//! inconclusive. Strictly read-only; never written, never retried.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Deserialize;

use crate::path::TargetFile;

/// Key under which the editor family stores its recently-opened list.
pub const RECENTLY_OPENED_KEY: &str = "history.recentlyOpenedPathsList";

/// Fetches raw values by string key from an embedded database file.
pub trait KvStateReader {
    /// The value for `key`, or `None` on any failure (missing file, locked
    /// database, absent key).
    fn string_value(&self, db: &Path, key: &str) -> Option<String>;
}

pub struct SqliteStateReader;

impl KvStateReader for SqliteStateReader {
    fn string_value(&self, db: &Path, key: &str) -> Option<String> {
        match read_value(db, key) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(db = %db.display(), key, error = %err, "state-db read failed");
                None
            }
        }
    }
}

fn read_value(db: &Path, key: &str) -> Result<Option<String>, rusqlite::Error> {
    let conn = Connection::open_with_flags(
        db,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(std::time::Duration::from_millis(50))?;

    let value = conn
        .query_row(
            "SELECT value FROM ItemTable WHERE key = ?1 LIMIT 1",
            [key],
            |row| {
                let bytes = match row.get_ref(0)? {
                    ValueRef::Text(text) => text.to_vec(),
                    ValueRef::Blob(blob) => blob.to_vec(),
                    _ => Vec::new(),
                };
                Ok(String::from_utf8(bytes).ok())
            },
        )
        .optional()?;

    Ok(value.flatten())
}

/// Parses the recently-opened payload: `{"entries":[{"fileUri":"file://…"},…]}`.
/// Folder entries and malformed URIs are skipped.
pub fn parse_recently_opened(raw: &str) -> Vec<TargetFile> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(default)]
        entries: Vec<Entry>,
    }

    #[derive(Deserialize)]
    struct Entry {
        #[serde(rename = "fileUri")]
        file_uri: Option<String>,
    }

    serde_json::from_str::<Payload>(raw)
        .map(|payload| {
            payload
                .entries
                .into_iter()
                .filter_map(|entry| entry.file_uri)
                .filter_map(|uri| TargetFile::from_input(&uri))
                .collect()
        })
        .unwrap_or_default()
}
