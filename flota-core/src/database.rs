use crate::common::error::{FlotaError, Result};
use libsql::{Builder, Connection, Database};
use std::env;
use tracing::info;

fn db_error(context: &'static str) -> impl Fn(libsql::Error) -> FlotaError {
    move |e| FlotaError::Database {
        message: format!("{context}: {e}"),
    }
}

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Connect using `LIBSQL_URL` (and `LIBSQL_AUTH_TOKEN` for remote Turso
    /// databases). A `file:` URL opens a local database.
    pub async fn new() -> Result<Self> {
        let url = env::var("LIBSQL_URL").map_err(|_| FlotaError::Database {
            message: "LIBSQL_URL environment variable not set".to_string(),
        })?;

        let db = if let Some(path) = url.strip_prefix("file:") {
            info!("Opening local libSQL database at {}", path);
            Builder::new_local(path)
                .build()
                .await
                .map_err(db_error("Failed to open database"))?
        } else {
            let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| FlotaError::Database {
                message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
            })?;
            info!("Connecting to Turso database at {}", url);
            Builder::new_remote(url, auth_token)
                .build()
                .await
                .map_err(db_error("Failed to connect to database"))?
        };

        Ok(Self { db })
    }

    pub async fn get_connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(db_error("Failed to get database connection"))
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;
        let migration_sql_001 = include_str!("../migrations/001_create_documents.sql");
        conn.execute_batch(migration_sql_001)
            .await
            .map_err(db_error("Failed to run documents migration"))?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Insert a document; false when `(collection, id)` already exists
    pub async fn insert_document(&self, collection: &str, id: &str, data: &str) -> Result<bool> {
        let conn = self.get_connection().await?;
        let inserted = conn
            .execute(
                "INSERT INTO documents (collection, id, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'), datetime('now'))
                 ON CONFLICT(collection, id) DO NOTHING",
                libsql::params![collection, id, data],
            )
            .await
            .map_err(db_error("Failed to insert document"))?;
        Ok(inserted > 0)
    }

    /// Replace the data of an existing document; false when it does not exist
    pub async fn replace_document(&self, collection: &str, id: &str, data: &str) -> Result<bool> {
        let conn = self.get_connection().await?;
        let updated = conn
            .execute(
                "UPDATE documents SET data = ?3, updated_at = datetime('now')
                 WHERE collection = ?1 AND id = ?2",
                libsql::params![collection, id, data],
            )
            .await
            .map_err(db_error("Failed to update document"))?;
        Ok(updated > 0)
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<String>> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                libsql::params![collection, id],
            )
            .await
            .map_err(db_error("Failed to query document"))?;

        match rows.next().await.map_err(db_error("Failed to read row"))? {
            Some(row) => Ok(Some(row.get(0).map_err(db_error("Failed to get data"))?)),
            None => Ok(None),
        }
    }

    /// All documents of a collection, ordered by id
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<String>> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT data FROM documents WHERE collection = ?1 ORDER BY id",
                libsql::params![collection],
            )
            .await
            .map_err(db_error("Failed to query documents"))?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_error("Failed to read row"))? {
            let data: String = row.get(0).map_err(db_error("Failed to get data"))?;
            results.push(data);
        }
        Ok(results)
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        let conn = self.get_connection().await?;
        let deleted = conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                libsql::params![collection, id],
            )
            .await
            .map_err(db_error("Failed to delete document"))?;
        Ok(deleted > 0)
    }
}
