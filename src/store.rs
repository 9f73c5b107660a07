//! SQLite-backed local copy of the rocket catalog.
//!
//! Reads are exposed both as one-shot snapshots and as change streams. Every
//! committed write bumps a revision on a `watch` channel; each stream
//! re-queries the table when it sees a new revision, so a subscriber always
//! ends up looking at the latest committed state.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures::stream::{BoxStream, StreamExt};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::error::StoreError;
use crate::models::RocketEntity;

/// Stream of full, name-ordered table snapshots.
pub type EntityListStream = BoxStream<'static, Result<Vec<RocketEntity>, StoreError>>;
/// Stream of a single row, `None` while no row has the requested id.
pub type EntityStream = BoxStream<'static, Result<Option<RocketEntity>, StoreError>>;

const SELECT_COLUMNS: &str = "SELECT id, name, description, active, cost_per_launch, \
     first_flight, image_url, height_meters, mass_kg FROM rockets";

#[derive(Clone)]
pub struct RocketStore {
    conn: Arc<Mutex<Connection>>,
    revision: Arc<watch::Sender<u64>>,
}

impl RocketStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA synchronous=NORMAL;\
             PRAGMA busy_timeout=5000;",
        )?;
        debug!(path = %path.display(), "opened rocket store");
        Self::with_connection(conn)
    }

    /// A store that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("spaceapps.db")
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::create_tables(&conn)?;
        let (revision, _) = watch::channel(0);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            revision: Arc::new(revision),
        })
    }

    fn create_tables(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS rockets (
                id              TEXT PRIMARY KEY NOT NULL,
                name            TEXT NOT NULL,
                description     TEXT NOT NULL,
                active          INTEGER NOT NULL,
                cost_per_launch INTEGER NOT NULL,
                first_flight    TEXT NOT NULL,
                image_url       TEXT,
                height_meters   REAL,
                mass_kg         INTEGER
            );",
        )?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool. A poisoned
    /// mutex is recovered; the connection itself is still usable.
    async fn with_conn<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Insert-or-replace every entity by id in one transaction. Rows whose id
    /// is not in `entities` are left alone.
    pub async fn upsert_all(&self, entities: Vec<RocketEntity>) -> Result<(), StoreError> {
        let count = entities.len();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO rockets (id, name, description, active, \
                     cost_per_launch, first_flight, image_url, height_meters, mass_kg) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )?;
                for e in &entities {
                    stmt.execute(params![
                        e.id,
                        e.name,
                        e.description,
                        e.active,
                        e.cost_per_launch,
                        e.first_flight,
                        e.image_url,
                        e.height_meters,
                        e.mass_kg,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await?;
        debug!(count, "upserted rockets");
        self.notify();
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let removed = self
            .with_conn(|conn| Ok(conn.execute("DELETE FROM rockets", [])?))
            .await?;
        debug!(removed, "cleared rockets");
        self.notify();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Every row, ordered by name.
    pub async fn all(&self) -> Result<Vec<RocketEntity>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY name ASC"))?;
            let mut rows = stmt.query([])?;
            let mut rockets = Vec::new();
            while let Some(row) = rows.next()? {
                rockets.push(row_to_entity(row)?);
            }
            Ok(rockets)
        })
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<RocketEntity>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let entity = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?1 LIMIT 1"),
                    params![id],
                    row_to_entity,
                )
                .optional()?;
            Ok(entity)
        })
        .await
    }

    /// Current snapshot immediately, then a fresh snapshot after each write.
    pub fn observe_all(&self) -> EntityListStream {
        let store = self.clone();
        WatchStream::new(self.revision.subscribe())
            .then(move |_| {
                let store = store.clone();
                async move { store.all().await }
            })
            .boxed()
    }

    /// Current row (or `None`) immediately, then again after each write.
    pub fn observe_one(&self, id: &str) -> EntityStream {
        let store = self.clone();
        let id = id.to_string();
        WatchStream::new(self.revision.subscribe())
            .then(move |_| {
                let store = store.clone();
                let id = id.clone();
                async move { store.get(&id).await }
            })
            .boxed()
    }
}

fn row_to_entity(row: &Row<'_>) -> rusqlite::Result<RocketEntity> {
    Ok(RocketEntity {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        active: row.get(3)?,
        cost_per_launch: row.get(4)?,
        first_flight: row.get(5)?,
        image_url: row.get(6)?,
        height_meters: row.get(7)?,
        mass_kg: row.get(8)?,
    })
}
