use super::traits::{Document, Filter, Storage};
use crate::common::error::{FlotaError, Result};
use crate::reconcile::document_id;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-memory storage implementation for development/testing
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|_| FlotaError::storage("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String> {
        let id = document_id(&doc)
            .ok_or_else(|| FlotaError::storage("document without _id"))?;
        doc.insert("_id".into(), Value::String(id.clone()));

        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(FlotaError::conflict(format!(
                "Ya existe un documento con id {id} en {collection}"
            )));
        }
        docs.insert(id.clone(), doc);

        debug!("Inserted {} into {}", id, collection);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<bool> {
        let mut collections = self.lock()?;
        let Some(doc) = collections.get_mut(collection).and_then(|docs| docs.get_mut(id)) else {
            return Ok(false);
        };
        for (key, value) in fields {
            if key != "_id" {
                doc.insert(key, value);
            }
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.lock()?;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let store = InMemoryStorage::new();
        store
            .insert("Vehiculos", doc(json!({"_id": "AB123CD", "COLOR": "Rojo"})))
            .await
            .unwrap();

        let dup = store
            .insert("Vehiculos", doc(json!({"_id": "AB123CD"})))
            .await
            .unwrap_err();
        assert!(matches!(dup, FlotaError::Conflict(_)));

        let updated = store
            .update("Vehiculos", "AB123CD", doc(json!({"COLOR": "Azul", "_id": "OTRO"})))
            .await
            .unwrap();
        assert!(updated);
        let stored = store.get("Vehiculos", "AB123CD").await.unwrap().unwrap();
        assert_eq!(stored["COLOR"], "Azul");
        assert_eq!(stored["_id"], "AB123CD");

        assert!(!store.update("Vehiculos", "NOPE", Document::new()).await.unwrap());
        assert_eq!(store.count("Vehiculos", &Filter::all()).await.unwrap(), 1);
        assert!(store.delete("Vehiculos", "AB123CD").await.unwrap());
        assert!(!store.delete("Vehiculos", "AB123CD").await.unwrap());
    }

    #[tokio::test]
    async fn test_numeric_ids_are_stored_as_strings() {
        let store = InMemoryStorage::new();
        let id = store
            .insert("Finanzas", doc(json!({"_id": 42, "monto": 10})))
            .await
            .unwrap();
        assert_eq!(id, "42");
        assert!(store.get("Finanzas", "42").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_filters_by_patente() {
        let store = InMemoryStorage::new();
        store
            .insert("Mantenimiento", doc(json!({"_id": "1", "patente": "AB 123 CD"})))
            .await
            .unwrap();
        store
            .insert("Mantenimiento", doc(json!({"_id": "2", "PATENTE": "ZZ999ZZ"})))
            .await
            .unwrap();
        let found = store
            .find("Mantenimiento", &Filter::all().patente("ab123cd"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["_id"], "1");
        assert!(store.find("Otra", &Filter::all()).await.unwrap().is_empty());
    }
}
