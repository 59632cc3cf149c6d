use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;

pub const KEY_THEME: &str = "theme";
pub const KEY_LOGGED_IN: &str = "newslenss-logged-in";
pub const KEY_REMEMBERED_USERNAME: &str = "newslenss-remembered-username";
pub const KEY_HISTORY: &str = "newslenss-history";
pub const KEY_ANALYTICS: &str = "newslenss-analytics";

/// Local key-value persistence. No transactions across keys; last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, AppError> {
        self.entries.lock().map_err(|e| {
            AppError::new("STORE_LOCK_FAILED", "In-memory store lock was poisoned")
                .with_details(e.to_string())
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// SQLite-backed store; one row per key in the `kv` table.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if path.as_os_str().is_empty() {
            return Err(AppError::new("STORE_INVALID_PATH", "Store path is empty"));
        }
        if path.is_dir() {
            return Err(AppError::new(
                "STORE_INVALID_PATH",
                "Store path must be a file (not a directory)",
            )
            .with_details(path.display().to_string()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::new("STORE_OPEN_FAILED", "Failed to create store directory")
                    .with_details(format!("path={}; err={}", parent.display(), e))
            })?;
        }
        let mut conn = crate::db::open(path)?;
        crate::db::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let mut conn = crate::db::open_in_memory()?;
        crate::db::migrate(&mut conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(|e| {
                AppError::new("STORE_READ_FAILED", "Failed to read store key")
                    .with_details(format!("key={key}; err={e}"))
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.conn
            .execute(
                r#"INSERT INTO kv(key, value, updated_at)
                   VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ','now'))
                   ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
                params![key, value],
            )
            .map_err(|e| {
                AppError::new("STORE_WRITE_FAILED", "Failed to write store key")
                    .with_details(format!("key={key}; err={e}"))
            })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .map_err(|e| {
                AppError::new("STORE_WRITE_FAILED", "Failed to remove store key")
                    .with_details(format!("key={key}; err={e}"))
            })?;
        Ok(())
    }
}
