//! JSON import/export of the whole store.
//!
//! Format: `{ "decks": [ { "id", "name", "cards": [ { "id", "frontText", "backText", "tags",
//! "frontImage", "backImage", "interval", "ease", "nextReview", "reviews" } ] } ] }`
//! with ISO-8601 timestamps.

use crate::error::{FlashcardError, Result};
use crate::models::Store;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn export_json(store: &Store) -> Result<String> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Exports the store to a JSON file at the specified path.
pub fn export_json_to_path<P: AsRef<Path>>(store: &Store, path: P) -> Result<()> {
    fs::write(path.as_ref(), export_json(store)?)?;
    info!(path = %path.as_ref().display(), decks = store.decks.len(), "store exported");
    Ok(())
}

/// `flashcards_backup_<timestamp>.json`, with `:` and `.` made file-name safe.
pub fn default_export_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("flashcards_backup_{stamp}.json")
}

/// Parses an exported document. Anything without a `decks` array, malformed cards,
/// cards breaking the data-model rules (blank text, non-positive interval, ease below
/// the floor), or duplicate ids is an `ImportFormat` error.
pub fn parse_import(text: &str) -> Result<Store> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| FlashcardError::ImportFormat(format!("not valid JSON ({e})")))?;

    if !value.get("decks").is_some_and(Value::is_array) {
        return Err(FlashcardError::ImportFormat(
            "expected an object with a \"decks\" array".to_string(),
        ));
    }

    let store: Store = serde_json::from_value(value)
        .map_err(|e| FlashcardError::ImportFormat(e.to_string()))?;

    store.validate().map_err(FlashcardError::ImportFormat)?;
    Ok(store)
}

/// Imports a store from a JSON file.
pub fn import_json<P: AsRef<Path>>(path: P) -> Result<Store> {
    let contents = fs::read_to_string(path.as_ref())?;
    let store = parse_import(&contents)?;
    info!(path = %path.as_ref().display(), decks = store.decks.len(), "store imported");
    Ok(store)
}
