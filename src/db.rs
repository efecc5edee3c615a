use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Durable key/value storage for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

pub struct SqlitePreferenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePreferenceStore {
    /// Opens (creating if needed) `preferences.db` under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("creating data directory {}", data_dir.display()))?;
        }

        let db_path = data_dir.join("preferences.db");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("opening {}", db_path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// `~/.hn_search`, the default location for the database and config.
    pub fn default_data_dir() -> Result<PathBuf> {
        let home_dir =
            dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home_dir.join(".hn_search"))
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| anyhow!("Failed to lock database connection"))?;
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| anyhow!("Failed to lock database connection"))?;
        conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// In-memory store that also keeps a log of every write.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Every `(key, value)` passed to `save`, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| anyhow!("Failed to lock preference map"))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow!("Failed to lock preference map"))?
            .insert(key.to_string(), value.to_string());
        self.writes
            .lock()
            .map_err(|_| anyhow!("Failed to lock write log"))?
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// A value mirrored into a [`PreferenceStore`].
///
/// The initial value comes from the store (or `default` when nothing, or
/// an empty string, is stored) and is not written back. Each later change
/// is written exactly once. Write errors are logged and otherwise ignored.
///
/// Writes happen synchronously inside `set`, so they reach the store in
/// the order the changes were made and the last change is always the one
/// persisted. Callers never observe the outcome of a write.
pub struct SemiPersistentState<S: PreferenceStore> {
    store: S,
    key: String,
    value: String,
}

impl<S: PreferenceStore> SemiPersistentState<S> {
    pub fn new(store: S, key: impl Into<String>, default: &str) -> Self {
        let key = key.into();
        let value = match store.load(&key) {
            Ok(Some(stored)) if !stored.is_empty() => stored,
            Ok(_) => default.to_string(),
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    "failed to load preference, using default"
                );
                default.to_string()
            }
        };

        Self { store, key, value }
    }

    pub fn get(&self) -> &str {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Updates the value, persisting it when it differs from the current one.
    /// Returns whether a change happened.
    pub fn set(&mut self, value: &str) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value.to_string();

        if let Err(e) = self.store.save(&self.key, &self.value) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist preference");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_written_and_change_is_written_once() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut term = SemiPersistentState::new(store.clone(), "search", "React");

        assert_eq!(term.get(), "React");
        assert!(store.writes().is_empty());

        assert!(term.set("Redux"));
        assert_eq!(store.writes(), vec![("search".to_string(), "Redux".to_string())]);
    }

    #[test]
    fn stored_value_wins_over_default() {
        let store = Arc::new(MemoryPreferenceStore::with_value("search", "Rust"));
        let term = SemiPersistentState::new(store.clone(), "search", "React");

        assert_eq!(term.get(), "Rust");
        assert!(store.writes().is_empty());
    }

    #[test]
    fn stored_empty_value_falls_back_to_default() {
        let store = Arc::new(MemoryPreferenceStore::with_value("search", ""));
        let term = SemiPersistentState::new(store.clone(), "search", "React");

        assert_eq!(term.get(), "React");
        assert!(store.writes().is_empty());
    }

    #[test]
    fn rapid_changes_persist_the_last_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqlitePreferenceStore::open(dir.path()).unwrap());
        let mut term = SemiPersistentState::new(store.clone(), "search", "React");

        for prefix in ["R", "Ru", "Rus", "Rust"] {
            term.set(prefix);
        }
        assert_eq!(store.load("search").unwrap().as_deref(), Some("Rust"));
    }

    #[test]
    fn setting_the_same_value_does_not_write() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut term = SemiPersistentState::new(store.clone(), "search", "React");

        assert!(!term.set("React"));
        assert!(term.set("Re"));
        assert!(!term.set("Re"));
        assert!(term.set(""));

        let values: Vec<String> = store.writes().into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["Re".to_string(), String::new()]);
    }

    #[test]
    fn sqlite_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePreferenceStore::open(dir.path()).unwrap();

        assert_eq!(store.load("search").unwrap(), None);
        store.save("search", "React").unwrap();
        store.save("search", "Redux").unwrap();
        assert_eq!(store.load("search").unwrap().as_deref(), Some("Redux"));
    }

    #[test]
    fn sqlite_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        SqlitePreferenceStore::open(&nested).unwrap();
        assert!(nested.join("preferences.db").exists());
    }
}
