use chrono::Utc;
use conclave_models::cache_schema::{CacheRow, CACHE_TABLE_DDL};
use rusqlite::{Connection, OpenFlags, Row};

use crate::error::CacheError;

const SELECT_COLUMNS: &str =
    "SELECT key, category, value_json, source, symbol, created_at, expires_at, updated_at \
     FROM cache_entries";

/// SQLite accessor for the shared market-data cache.
///
/// A data pipeline owns the database; the committee opens it read-only.
/// `create` and `open_in_memory` exist for seeding and tests.
pub struct SqliteReader {
    conn: Connection,
}

impl SqliteReader {
    /// Open an existing cache database read-only.
    pub fn open(path: &str) -> Result<Self, CacheError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Open (or create) a writable database and make sure the schema exists.
    pub fn create(path: &str) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(CACHE_TABLE_DDL)?;
        Ok(Self { conn })
    }

    /// Writable in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CACHE_TABLE_DDL)?;
        Ok(Self { conn })
    }

    /// Single entry by key. Expired entries are filtered in the query.
    pub fn get(&self, key: &str) -> Result<Option<CacheRow>, CacheError> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{SELECT_COLUMNS} WHERE key = ?1 AND expires_at > ?2"))?;

        match stmt.query_row(rusqlite::params![key, now], cache_row) {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CacheError::Sqlite(e)),
        }
    }

    /// Insert or replace an entry.
    pub fn insert(&self, row: &CacheRow) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache_entries \
             (key, category, value_json, source, symbol, created_at, expires_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.key,
                row.category,
                row.value_json,
                row.source,
                row.symbol,
                row.created_at,
                row.expires_at,
                row.updated_at,
            ],
        )?;
        Ok(())
    }
}

fn cache_row(row: &Row<'_>) -> rusqlite::Result<CacheRow> {
    Ok(CacheRow {
        key: row.get(0)?,
        category: row.get(1)?,
        value_json: row.get(2)?,
        source: row.get(3)?,
        symbol: row.get(4)?,
        created_at: row.get(5)?,
        expires_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
