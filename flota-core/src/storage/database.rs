use super::traits::{Document, Filter, Storage};
use crate::common::error::{FlotaError, Result};
use crate::database::DatabaseManager;
use crate::reconcile::document_id;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Document storage on Turso/libSQL: one `documents` row per document, JSON in `data`
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub async fn new() -> Result<Self> {
        let db_manager = DatabaseManager::new().await?;
        db_manager.run_migrations().await?;

        Ok(Self {
            db: Arc::new(db_manager),
        })
    }

    fn decode(data: &str) -> Result<Document> {
        serde_json::from_str(data).map_err(|e| FlotaError::Database {
            message: format!("Failed to deserialize document: {e}"),
        })
    }

    fn encode(doc: &Document) -> Result<String> {
        serde_json::to_string(doc).map_err(|e| FlotaError::Database {
            message: format!("Failed to serialize document: {e}"),
        })
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String> {
        let id = document_id(&doc).ok_or_else(|| FlotaError::storage("document without _id"))?;
        doc.insert("_id".into(), Value::String(id.clone()));

        if !self
            .db
            .insert_document(collection, &id, &Self::encode(&doc)?)
            .await?
        {
            return Err(FlotaError::conflict(format!(
                "Ya existe un documento con id {id} en {collection}"
            )));
        }
        debug!("Inserted {} into {}", id, collection);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.db
            .get_document(collection, id)
            .await?
            .map(|data| Self::decode(&data))
            .transpose()
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for data in self.db.list_documents(collection).await? {
            let doc = Self::decode(&data)?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<bool> {
        let Some(mut doc) = self.get(collection, id).await? else {
            return Ok(false);
        };
        for (key, value) in fields {
            if key != "_id" {
                doc.insert(key, value);
            }
        }
        self.db
            .replace_document(collection, id, &Self::encode(&doc)?)
            .await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        self.db.delete_document(collection, id).await
    }
}
