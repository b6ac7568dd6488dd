//! libSQL backend: async `DocumentBackend` implementation.
//!
//! Documents live in a single `documents` table keyed by
//! `(collection, id)` with the record serialized as JSON in `body`.
//! Supports local file, in-memory, and remote (`libsql://`) databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::DocumentBackend;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open a backend from a location string: `:memory:`, a `libsql://` or
    /// `http(s)://` URL, or a local file path.
    pub async fn open(
        location: &str,
        auth_token: Option<&SecretString>,
    ) -> Result<Self, DatabaseError> {
        if location == ":memory:" {
            Self::new_memory().await
        } else if is_remote(location) {
            let token = auth_token.map(|t| t.expose_secret().to_string()).unwrap_or_default();
            Self::new_remote(location, token).await
        } else {
            Self::new_local(Path::new(location)).await
        }
    }

    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Connect to a remote libSQL server.
    pub async fn new_remote(url: &str, auth_token: String) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to connect to {url}: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(url = %url, "Remote database connected");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn is_remote(location: &str) -> bool {
    ["libsql://", "https://", "http://", "wss://", "ws://"]
        .iter()
        .any(|scheme| location.starts_with(scheme))
}

fn encode_body(doc: &Value) -> Result<String, DatabaseError> {
    serde_json::to_string(doc).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn decode_body(row: &libsql::Row, idx: i32) -> Result<Value, DatabaseError> {
    let body: String = row
        .get(idx)
        .map_err(|e| DatabaseError::Query(format!("documents.body: {e}")))?;
    serde_json::from_str(&body).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn map_write_error(op: &str, e: libsql::Error) -> DatabaseError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        DatabaseError::Constraint(format!("{op}: {message}"))
    } else {
        DatabaseError::Query(format!("{op}: {message}"))
    }
}

#[async_trait]
impl DocumentBackend for LibSqlBackend {
    fn name(&self) -> &str {
        "libsql"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT 1", ())
            .await
            .map_err(|e| DatabaseError::Pool(format!("ping: {e}")))?;
        rows.next()
            .await
            .map_err(|e| DatabaseError::Pool(format!("ping row: {e}")))?;
        Ok(())
    }

    async fn insert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO documents (collection, id, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
                params![collection, id, encode_body(doc)?, now],
            )
            .await
            .map_err(|e| map_write_error("insert", e))?;
        debug!(collection, id, "Document inserted");
        Ok(())
    }

    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO documents (collection, id, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(collection, id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
                params![collection, id, encode_body(doc)?, now],
            )
            .await
            .map_err(|e| map_write_error("upsert", e))?;
        debug!(collection, id, "Document upserted");
        Ok(())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid ASC",
                params![collection],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_all: {e}")))?;

        let mut docs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("find_all row: {e}")))?
        {
            docs.push(decode_body(&row, 0)?);
        }
        Ok(docs)
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_one: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(decode_body(&row, 0)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("find_one row: {e}"))),
        }
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        doc: &Value,
    ) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "UPDATE documents SET body = ?1, updated_at = ?2 WHERE collection = ?3 AND id = ?4",
                params![encode_body(doc)?, Utc::now().to_rfc3339(), collection, id],
            )
            .await
            .map_err(|e| map_write_error("replace", e))?;
        Ok(count > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete: {e}")))?;
        Ok(count > 0)
    }

    async fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize, DatabaseError> {
        let mut removed = 0;
        for id in ids {
            if self.delete(collection, id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
