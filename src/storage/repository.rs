//! Advertisement store
//!
//! Trait-based store abstraction so the pipeline can be exercised against a
//! mock in tests, plus the SQLite implementation used in production. The
//! store assigns row identity and stamps `date_created` at write time; the
//! pipeline never sees either before persistence.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::models::Advertisement;

/// One advertisement as it exists in durable storage
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredAdvertisement {
    /// Store-assigned identity
    pub id: i64,

    /// The normalized record
    pub advertisement: Advertisement,

    /// Write-time stamp, assigned by the store
    pub date_created: DateTime<Utc>,
}

/// Durable advertisement storage
///
/// `begin`/`create`/`commit` form one unit of work per job persist stage.
/// A failed `create` leaves the unit of work usable; the batch commit is
/// expected to proceed around it.
pub trait AdvertStore: Send + Sync {
    /// Open a unit of work
    fn begin(&self) -> Result<(), StoreError>;

    /// Persist one record inside the open unit of work
    fn create(&self, advert: &Advertisement) -> Result<(), StoreError>;

    /// Commit the open unit of work
    fn commit(&self) -> Result<(), StoreError>;

    /// Fetch records whose query matches `query` (case-insensitive substring)
    /// and whose `date_added` lies in `(from, to]`
    ///
    /// The literal query `"all"` instead returns every record in range that
    /// carries a non-zero price.
    fn adverts_for(
        &self,
        query: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredAdvertisement>, StoreError>;

    /// Distinct query strings ever ingested
    fn distinct_queries(&self) -> Result<Vec<String>, StoreError>;

    /// Count stored records
    fn count(&self) -> Result<usize, StoreError>;
}

/// SQLite implementation of [`AdvertStore`]
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteAdvertStore {
    conn: Mutex<Connection>,
}

impl SqliteAdvertStore {
    /// Create a new SQLite store at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                StoreError::Unavailable(format!("cannot create {}: {err}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite advert store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Create database schema
    fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS adverts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                price INTEGER NOT NULL,
                place TEXT NOT NULL,
                query TEXT NOT NULL,
                tags TEXT NOT NULL,
                date_added TEXT NOT NULL,
                date_created TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_adverts_query ON adverts(query)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_adverts_date_added ON adverts(date_added)",
            [],
        )?;

        Ok(())
    }
}

impl AdvertStore for SqliteAdvertStore {
    fn begin(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn create(&self, advert: &Advertisement) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute(
            "INSERT INTO adverts (title, url, price, place, query, tags, date_added, date_created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                advert.title,
                advert.url,
                advert.price,
                advert.place,
                advert.query,
                advert.tag,
                advert.date_added.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn adverts_for(
        &self,
        query: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredAdvertisement>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");

        // RFC 3339 UTC strings compare lexicographically in date order
        let from = from.to_rfc3339();
        let to = to.to_rfc3339();

        let mut rows = Vec::new();
        if query == "all" {
            let mut stmt = conn.prepare(
                "SELECT id, title, url, price, place, query, tags, date_added, date_created
                 FROM adverts
                 WHERE price > 0 AND date_added > ?1 AND date_added <= ?2
                 ORDER BY date_added",
            )?;
            let mapped = stmt.query_map(params![from, to], map_row)?;
            for row in mapped {
                rows.push(row??);
            }
        } else {
            let mut stmt = conn.prepare(
                "SELECT id, title, url, price, place, query, tags, date_added, date_created
                 FROM adverts
                 WHERE query LIKE '%' || ?1 || '%' AND date_added > ?2 AND date_added <= ?3
                 ORDER BY date_added",
            )?;
            let mapped = stmt.query_map(params![query, from, to], map_row)?;
            for row in mapped {
                rows.push(row??);
            }
        }

        Ok(rows)
    }

    fn distinct_queries(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare("SELECT DISTINCT query FROM adverts ORDER BY query")?;
        let mapped = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut queries = Vec::new();
        for query in mapped {
            queries.push(query?);
        }
        Ok(queries)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM adverts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

type RowResult = Result<StoredAdvertisement, StoreError>;

/// Map one adverts row, surfacing timestamp corruption as `BadRow`
fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RowResult> {
    let id: i64 = row.get(0)?;
    let date_added: String = row.get(7)?;
    let date_created: String = row.get(8)?;

    let advert = Advertisement {
        title: row.get(1)?,
        url: row.get(2)?,
        price: row.get(3)?,
        place: row.get(4)?,
        query: row.get(5)?,
        tag: row.get(6)?,
        date_added: match parse_stored_timestamp(&date_added) {
            Some(dt) => dt,
            None => return Ok(Err(StoreError::BadRow(format!("row {id}: {date_added}")))),
        },
    };

    let date_created = match parse_stored_timestamp(&date_created) {
        Some(dt) => dt,
        None => return Ok(Err(StoreError::BadRow(format!("row {id}: {date_created}")))),
    };

    Ok(Ok(StoredAdvertisement {
        id,
        advertisement: advert,
        date_created,
    }))
}

fn parse_stored_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
