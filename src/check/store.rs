//! Persistent key-value state shared between checks

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::check::error::StoreError;
use crate::config::{KEY_LAST_CHECK_DATE, KEY_SKIPPED_VERSION};

/// Trait for reading and writing the state that survives between checks
#[cfg_attr(test, automock)]
pub trait StateStore: Send + Sync + 'static {
    /// Epoch millis of the last successful check, `0` if never checked
    fn last_check_timestamp(&self) -> Result<i64, StoreError>;

    fn set_last_check_timestamp(&self, timestamp_ms: i64) -> Result<(), StoreError>;

    /// The version the user chose to skip, empty if none
    fn skipped_version(&self) -> Result<String, StoreError>;

    fn set_skipped_version(&self, version: &str) -> Result<(), StoreError>;
}

/// SQLite-backed [`StateStore`]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        info!("Opening state database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating state schema");

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = Self::current_timestamp_ms();
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            (key, value, now),
        )?;
        Ok(())
    }

    /// Forget the last check time and any skipped version
    pub fn clear(&self) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "DELETE FROM preferences WHERE key IN (?1, ?2)",
            (KEY_LAST_CHECK_DATE, KEY_SKIPPED_VERSION),
        )?;
        info!("Cleared persisted update state");
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn last_check_timestamp(&self) -> Result<i64, StoreError> {
        // A value that no longer parses is treated like a store that never checked
        Ok(self
            .get(KEY_LAST_CHECK_DATE)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    fn set_last_check_timestamp(&self, timestamp_ms: i64) -> Result<(), StoreError> {
        debug!("Recording last check at {}", timestamp_ms);
        self.put(KEY_LAST_CHECK_DATE, &timestamp_ms.to_string())
    }

    fn skipped_version(&self) -> Result<String, StoreError> {
        Ok(self.get(KEY_SKIPPED_VERSION)?.unwrap_or_default())
    }

    fn set_skipped_version(&self, version: &str) -> Result<(), StoreError> {
        debug!("Recording skipped version {}", version);
        self.put(KEY_SKIPPED_VERSION, version)
    }
}
