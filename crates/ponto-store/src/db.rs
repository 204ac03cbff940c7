//! SQLite-backed identity and punch records.
//!
//! A single connection lives on a background thread (`tokio-rusqlite`); every
//! statement is serialized through it, so replacing an identity's reference
//! embedding is atomic with respect to concurrent readers of that identity.

use std::path::Path;

use chrono::{DateTime, Utc};
use ponto_core::Embedding;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{StoreError, StoreResult};
use crate::records::{Identity, IdentityId, NewIdentity, NewVerificationEvent, VerificationEvent};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS employees (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL,
    document       TEXT UNIQUE,
    email          TEXT UNIQUE,
    face_embedding TEXT,
    model_version  TEXT,
    photo_path     TEXT
);
CREATE TABLE IF NOT EXISTS punches (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL REFERENCES employees(id),
    ts          TEXT NOT NULL,
    lat         REAL,
    lon         REAL,
    similarity  REAL,
    photo_path  TEXT
);
CREATE INDEX IF NOT EXISTS idx_punches_ts ON punches(ts);
";

const IDENTITY_COLUMNS: &str =
    "id, name, document, email, face_embedding, model_version, photo_path";
const EVENT_COLUMNS: &str = "id, employee_id, ts, lat, lon, similarity, photo_path";

/// Raw `employees` row; the embedding stays JSON until decoded off the DB thread.
struct IdentityRow {
    id: i64,
    name: String,
    document: Option<String>,
    email: Option<String>,
    embedding: Option<String>,
    model_version: Option<String>,
    photo_path: Option<String>,
}

impl IdentityRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            document: row.get(2)?,
            email: row.get(3)?,
            embedding: row.get(4)?,
            model_version: row.get(5)?,
            photo_path: row.get(6)?,
        })
    }

    fn decode(self) -> StoreResult<Identity> {
        let reference = match self.embedding {
            Some(json) => {
                let values: Vec<f32> = serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
                    table: "employees",
                    id: self.id,
                    message: format!("face_embedding: {e}"),
                })?;
                Some(Embedding {
                    values,
                    model_version: self.model_version,
                })
            }
            None => None,
        };
        Ok(Identity {
            id: self.id,
            name: self.name,
            document: self.document,
            email: self.email,
            reference,
            photo_path: self.photo_path,
        })
    }
}

struct EventRow {
    id: i64,
    employee_id: i64,
    ts: String,
    lat: Option<f64>,
    lon: Option<f64>,
    similarity: Option<f64>,
    photo_path: Option<String>,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            ts: row.get(2)?,
            lat: row.get(3)?,
            lon: row.get(4)?,
            similarity: row.get(5)?,
            photo_path: row.get(6)?,
        })
    }

    fn decode(self) -> StoreResult<VerificationEvent> {
        let timestamp = DateTime::parse_from_rfc3339(&self.ts)
            .map_err(|e| StoreError::Corrupt {
                table: "punches",
                id: self.id,
                message: format!("ts {:?}: {e}", self.ts),
            })?
            .with_timezone(&Utc);
        Ok(VerificationEvent {
            id: self.id,
            identity_id: self.employee_id,
            timestamp,
            lat: self.lat,
            lon: self.lon,
            score: self.similarity.map(|s| s as f32),
            photo_path: self.photo_path,
        })
    }
}

fn encode_embedding(embedding: &Embedding) -> StoreResult<String> {
    Ok(serde_json::to_string(&embedding.values)?)
}

/// Handle to the identity/punch database. Cheap to clone.
#[derive(Clone)]
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).await?;
        tracing::info!(path = %path.display(), "opened record store");
        Self::init(conn).await
    }

    /// Fresh in-memory database, used by tests and dry runs.
    pub async fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory().await?).await
    }

    async fn init(conn: Connection) -> StoreResult<Self> {
        conn.call(|c| {
            c.pragma_update(None, "foreign_keys", "ON")?;
            c.execute_batch(SCHEMA)?;
            // Databases created before embeddings recorded their model.
            let has_version: bool = c.query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('employees') WHERE name = 'model_version'",
                [],
                |row| row.get(0),
            )?;
            if !has_version {
                c.execute_batch("ALTER TABLE employees ADD COLUMN model_version TEXT")?;
            }
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }

    /// Insert a new employee together with its reference embedding and image.
    pub async fn insert_identity(
        &self,
        new: NewIdentity,
        reference: &Embedding,
        photo_path: &str,
    ) -> StoreResult<Identity> {
        let embedding_json = encode_embedding(reference)?;
        let model_version = reference.model_version.clone();
        let photo = photo_path.to_string();
        let row = new.clone();

        let id = self
            .conn
            .call(move |c| {
                c.execute(
                    "INSERT INTO employees (name, document, email, face_embedding, model_version, photo_path)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![row.name, row.document, row.email, embedding_json, model_version, photo],
                )?;
                Ok(c.last_insert_rowid())
            })
            .await
            .map_err(StoreError::classify)?;

        tracing::debug!(id, "identity inserted");

        Ok(Identity {
            id,
            name: new.name,
            document: new.document,
            email: new.email,
            reference: Some(reference.clone()),
            photo_path: Some(photo_path.to_string()),
        })
    }

    pub async fn get_identity(&self, id: IdentityId) -> StoreResult<Option<Identity>> {
        let row = self
            .conn
            .call(move |c| {
                let sql = format!("SELECT {IDENTITY_COLUMNS} FROM employees WHERE id = ?1");
                Ok(c.query_row(&sql, [id], IdentityRow::from_row).optional()?)
            })
            .await?;
        row.map(IdentityRow::decode).transpose()
    }

    /// Replace the reference embedding and image path in one statement.
    ///
    /// Returns `None` when the identity does not exist.
    pub async fn replace_reference(
        &self,
        id: IdentityId,
        reference: &Embedding,
        photo_path: &str,
    ) -> StoreResult<Option<Identity>> {
        let embedding_json = encode_embedding(reference)?;
        let model_version = reference.model_version.clone();
        let photo = photo_path.to_string();

        let row = self
            .conn
            .call(move |c| {
                let tx = c.transaction()?;
                let changed = tx.execute(
                    "UPDATE employees SET face_embedding = ?1, model_version = ?2, photo_path = ?3
                     WHERE id = ?4",
                    params![embedding_json, model_version, photo, id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                let sql = format!("SELECT {IDENTITY_COLUMNS} FROM employees WHERE id = ?1");
                let row = tx.query_row(&sql, [id], IdentityRow::from_row)?;
                tx.commit()?;
                Ok(Some(row))
            })
            .await?;

        row.map(IdentityRow::decode).transpose()
    }

    pub async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        let rows = self
            .conn
            .call(|c| {
                let sql = format!("SELECT {IDENTITY_COLUMNS} FROM employees ORDER BY id");
                let mut stmt = c.prepare(&sql)?;
                let rows = stmt
                    .query_map([], IdentityRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        rows.into_iter().map(IdentityRow::decode).collect()
    }

    /// Append a verification event. Events are never updated afterwards.
    pub async fn insert_event(&self, new: NewVerificationEvent) -> StoreResult<VerificationEvent> {
        let row = new.clone();
        let id = self
            .conn
            .call(move |c| {
                c.execute(
                    "INSERT INTO punches (employee_id, ts, lat, lon, similarity, photo_path)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        row.identity_id,
                        row.timestamp.to_rfc3339(),
                        row.lat,
                        row.lon,
                        row.score.map(f64::from),
                        row.photo_path,
                    ],
                )?;
                Ok(c.last_insert_rowid())
            })
            .await?;

        tracing::debug!(id, identity_id = new.identity_id, "verification event recorded");
        Ok(new.with_id(id))
    }

    /// All events, ordered by id ascending.
    pub async fn list_events(&self) -> StoreResult<Vec<VerificationEvent>> {
        let rows = self
            .conn
            .call(|c| {
                let sql = format!("SELECT {EVENT_COLUMNS} FROM punches ORDER BY id");
                let mut stmt = c.prepare(&sql)?;
                let rows = stmt
                    .query_map([], EventRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        rows.into_iter().map(EventRow::decode).collect()
    }

    pub async fn count_events(&self, identity_id: IdentityId) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .call(move |c| {
                Ok(c.query_row(
                    "SELECT COUNT(*) FROM punches WHERE employee_id = ?1",
                    [identity_id],
                    |row| row.get(0),
                )?)
            })
            .await?;
        Ok(count as u64)
    }
}
