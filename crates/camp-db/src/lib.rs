//! SQLite storage for the summer program.
//!
//! Implements [`DocumentStore`] on top of `rusqlite`, keeping every
//! collection in one `documents` table.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Components take the store by value or by `&mut`, so a single caller at a
//! time is enforced by the borrow checker.
//!
//! # Schema
//!
//! Each row holds one document:
//! - `collection`: `rooms`, `people`, `shifts` or `schedule`
//! - `id`: the document id, unique per collection
//! - `data`: the document fields as a JSON object (the id is not repeated)
//! - `seq`: insertion order, kept when a document is replaced or patched
//!
//! Timestamps are ISO 8601 TEXT in UTC (e.g. `2026-07-10T09:00:00.000Z`).
//! Equality queries go through `json_extract`, so field values compare the
//! way SQLite's JSON functions expose them.
//!
//! # Failures
//!
//! Every [`DbError`] surfaces to components as a backend
//! [`StoreError`], which the core treats as retryable. A busy database waits
//! up to [`BUSY_TIMEOUT`] before reporting that.

use std::path::Path;
use std::time::Duration;

use camp_core::{Collection, Document, DocumentStore, Fields, StoreError};
use chrono::{SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// How long a write waits on a locked database.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The target document does not exist.
    #[error("{collection} document {id} does not exist")]
    Missing { collection: Collection, id: String },
    /// A stored `data` column is not a JSON object.
    #[error("invalid document data for {collection}/{id}: {message}")]
    InvalidDocument {
        collection: Collection,
        id: String,
        message: String,
    },
    /// Document fields could not be encoded.
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Missing { collection, id } => Self::Missing { collection, id },
            other => Self::backend_with("database operation failed", other),
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch(
            "
            -- One row per document; data holds the fields as a JSON object
            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);
            ",
        )?;
        Ok(())
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: Collection) -> Result<usize, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn list(&self, collection: Collection) -> Result<Vec<Document>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, data
            FROM documents
            WHERE collection = ?1
            ORDER BY seq ASC
            ",
        )?;
        let rows = stmt.query_map([collection.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut documents = Vec::new();
        for row in rows {
            let (id, data) = row?;
            documents.push(parse_document(collection, id, &data)?);
        }
        Ok(documents)
    }

    fn find(&self, collection: Collection, id: &str) -> Result<Option<Document>, DbError> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|data| parse_document(collection, id.to_string(), &data))
            .transpose()
    }

    fn insert(&mut self, collection: Collection, id: &str, fields: &Fields) -> Result<(), DbError> {
        let now = now();
        let data = serde_json::to_string(fields)?;
        self.conn.execute(
            "
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            ",
            params![collection.as_str(), id, data, now],
        )?;
        debug!(%collection, id, "wrote document");
        Ok(())
    }

    fn merge(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        let data: Option<String> = tx
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(data) = data else {
            return Err(DbError::Missing {
                collection,
                id: id.to_string(),
            });
        };
        let mut document = parse_document(collection, id.to_string(), &data)?;
        document.fields.extend(fields);
        tx.execute(
            "UPDATE documents SET data = ?3, updated_at = ?4 WHERE collection = ?1 AND id = ?2",
            params![
                collection.as_str(),
                id,
                serde_json::to_string(&document.fields)?,
                now()
            ],
        )?;
        tx.commit()?;
        debug!(%collection, id, "patched document");
        Ok(())
    }

    fn remove(&mut self, collection: Collection, id: &str) -> Result<(), DbError> {
        let deleted = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id],
        )?;
        if deleted == 0 {
            return Err(DbError::Missing {
                collection,
                id: id.to_string(),
            });
        }
        debug!(%collection, id, "deleted document");
        Ok(())
    }

    fn matching(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, DbError> {
        let path = format!("$.\"{field}\"");
        let mut documents = Vec::new();
        let mut push_rows = |stmt: &mut rusqlite::Statement<'_>,
                             params: &[&dyn rusqlite::ToSql]|
         -> Result<(), DbError> {
            let rows = stmt.query_map(params, |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (id, data) = row?;
                documents.push(parse_document(collection, id, &data)?);
            }
            Ok(())
        };

        if value.is_null() {
            // json_type distinguishes an explicit null from a missing field.
            let mut stmt = self.conn.prepare(
                "
                SELECT id, data
                FROM documents
                WHERE collection = ?1 AND json_type(data, ?2) = 'null'
                ORDER BY seq ASC
                ",
            )?;
            push_rows(&mut stmt, &[&collection.as_str(), &path])?;
        } else {
            let mut stmt = self.conn.prepare(
                "
                SELECT id, data
                FROM documents
                WHERE collection = ?1 AND json_extract(data, ?2) = ?3
                ORDER BY seq ASC
                ",
            )?;
            push_rows(&mut stmt, &[&collection.as_str(), &path, &sql_value(value)])?;
        }
        Ok(documents)
    }
}

impl DocumentStore for Database {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        Ok(self.list(collection)?)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, id)?)
    }

    fn create(&mut self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.insert(collection, &id, &fields)?;
        Ok(id)
    }

    fn put(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        Ok(self.insert(collection, id, &fields)?)
    }

    fn patch(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        Ok(self.merge(collection, id, fields)?)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        Ok(self.remove(collection, id)?)
    }

    fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self.matching(collection, field, value)?)
    }
}

fn parse_document(collection: Collection, id: String, data: &str) -> Result<Document, DbError> {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(fields)) => Ok(Document { id, fields }),
        Ok(other) => Err(DbError::InvalidDocument {
            collection,
            id,
            message: format!("expected a JSON object, found {other}"),
        }),
        Err(err) => Err(DbError::InvalidDocument {
            collection,
            id,
            message: err.to_string(),
        }),
    }
}

/// The SQL value `json_extract` yields for a JSON scalar.
fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => number.as_i64().map_or_else(
            || SqlValue::Real(number.as_f64().unwrap_or_default()),
            SqlValue::Integer,
        ),
        Value::String(text) => SqlValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
