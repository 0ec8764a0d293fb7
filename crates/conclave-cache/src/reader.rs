use std::sync::Mutex;
use std::time::Duration;

use conclave_models::CacheConfig;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::CacheError;
use crate::sqlite::SqliteReader;

/// Read-through cache: moka (hot) → SQLite (shared) → None.
///
/// SQLite hits are promoted into the hot tier, which holds raw JSON payloads
/// by key and expires them after the configured TTL so later pipeline writes
/// become visible. `rusqlite::Connection` is not `Sync`, so the reader sits
/// behind a `Mutex` and is queried synchronously while the guard is held.
pub struct CacheReader {
    hot: Cache<String, String>,
    sqlite: Mutex<SqliteReader>,
}

impl CacheReader {
    pub fn new(sqlite: SqliteReader, max_capacity: u64, hot_ttl: Duration) -> Self {
        Self {
            hot: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(hot_ttl)
                .build(),
            sqlite: Mutex::new(sqlite),
        }
    }

    /// Open the configured database read-only and size the hot tier from config.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        let sqlite = SqliteReader::open(&config.sqlite_path)?;
        Ok(Self::new(
            sqlite,
            config.memory_max_capacity,
            Duration::from_secs(config.memory_ttl_seconds),
        ))
    }

    /// Typed value by key.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_json(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Raw JSON payload by key.
    pub async fn get_json(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(json) = self.hot.get(key).await {
            trace!(key, "hot cache hit");
            return Ok(Some(json));
        }

        // The guard must be dropped before awaiting the moka insert.
        let row = self.with_sqlite(|db| db.get(key))?;

        match row {
            Some(row) => {
                self.hot.insert(key.to_string(), row.value_json.clone()).await;
                Ok(Some(row.value_json))
            }
            None => Ok(None),
        }
    }

    fn with_sqlite<T>(
        &self,
        f: impl FnOnce(&SqliteReader) -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        let db = self
            .sqlite
            .lock()
            .map_err(|e| CacheError::Unavailable(format!("SQLite mutex poisoned: {e}")))?;
        f(&db)
    }
}
