//! Persistence of the whole store.
//!
//! The store is kept as one JSON document under the `flashcardData` key of a small
//! key-value table. Every mutation is followed by a full save; there is no batching.

use crate::error::{FlashcardError, Result};
use crate::models::Store;
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::{Cell, RefCell};
use std::path::Path;
use tracing::{debug, info};

pub const STORE_KEY: &str = "flashcardData";

pub trait Storage {
    /// Loads the store, or the default single-deck store when nothing was saved yet.
    fn load(&self) -> Result<Store>;

    fn save(&self, store: &Store) -> Result<()>;
}

/// SQLite-backed key-value storage.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and the `app_state` table.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "database opened");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;
        Ok(Self { conn })
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn load(&self) -> Result<Store> {
        match self.get(STORE_KEY)? {
            Some(json) => {
                let store: Store = serde_json::from_str(&json)?;
                info!(decks = store.decks.len(), "store loaded");
                Ok(store)
            }
            None => {
                info!("no saved store, starting with the default deck");
                Ok(Store::default())
            }
        }
    }

    fn save(&self, store: &Store) -> Result<()> {
        let json = serde_json::to_string(store)?;
        self.set(STORE_KEY, &json)?;
        debug!(bytes = json.len(), "store saved");
        Ok(())
    }
}

/// In-memory storage for tests and headless use. Writes can be made to fail.
#[derive(Default)]
pub struct MemoryStorage {
    saved: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
    save_count: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }

    /// The last saved store, decoded.
    pub fn saved(&self) -> Result<Option<Store>> {
        self.saved
            .borrow()
            .as_deref()
            .map(|json| serde_json::from_str(json).map_err(FlashcardError::from))
            .transpose()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Store> {
        Ok(self.saved()?.unwrap_or_default())
    }

    fn save(&self, store: &Store) -> Result<()> {
        if self.fail_writes.get() {
            return Err(FlashcardError::Io(std::io::Error::other(
                "storage is not writable",
            )));
        }
        *self.saved.borrow_mut() = Some(serde_json::to_string(store)?);
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}
