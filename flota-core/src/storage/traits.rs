use crate::common::error::Result;
use crate::reconcile::{patente::normalize_patente, value_as_string};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw stored document. Every document carries a string `_id`.
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// Any of the keys holds the value (compared as text, so `12` matches `"12"`)
    Eq { keys: Vec<String>, value: String },
    /// The plate stored under `patente`/`PATENTE` normalizes to this plate
    Patente(String),
}

/// Conjunction of simple conditions, evaluated the same way by every backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(self, key: &str, value: impl Into<String>) -> Self {
        self.eq_any(&[key], value)
    }

    pub fn eq_any(mut self, keys: &[&str], value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            value: value.into(),
        });
        self
    }

    pub fn patente(mut self, patente: &str) -> Self {
        self.conditions
            .push(Condition::Patente(normalize_patente(patente)));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq { keys, value } => keys.iter().any(|k| {
                doc.get(k)
                    .and_then(value_as_string)
                    .is_some_and(|v| &v == value)
            }),
            Condition::Patente(patente) => ["patente", "PATENTE"].iter().any(|k| {
                doc.get(*k)
                    .and_then(value_as_string)
                    .is_some_and(|v| &normalize_patente(&v) == patente)
            }),
        })
    }
}

/// Document store over named collections (Mongo-style, schemaless)
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a new document; fails with a conflict when `_id` is taken
    async fn insert(&self, collection: &str, doc: Document) -> Result<String>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Merge `fields` into an existing document. Returns false when it does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<bool>;

    /// Returns false when the document did not exist
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize> {
        Ok(self.find(collection, filter).await?.len())
    }
}

/// A file about to be stored
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub metadata: Document,
}

/// Metadata kept alongside stored bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobInfo {
    pub file_id: String,
    pub filename: String,
    pub content_type: String,
    pub length: u64,
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Document,
}

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub info: BlobInfo,
    pub bytes: Vec<u8>,
}

/// Object store for receipts and policy scans (the GridFS role)
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the bytes, returning a new file id
    async fn put(&self, upload: BlobUpload) -> Result<String>;

    async fn get(&self, file_id: &str) -> Result<Option<StoredBlob>>;

    async fn delete(&self, file_id: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_filter_matching() {
        let d = doc(json!({"_id": "1", "PATENTE": "ab 123 cd", "numero": 12}));
        assert!(Filter::all().matches(&d));
        assert!(Filter::all().patente("AB-123-CD").matches(&d));
        assert!(Filter::all().eq("numero", "12").matches(&d));
        assert!(Filter::all().eq_any(&["otro", "numero"], "12").matches(&d));
        assert!(!Filter::all().patente("ZZ999ZZ").matches(&d));
        assert!(!Filter::all().patente("AB123CD").eq("numero", "13").matches(&d));
    }
}
