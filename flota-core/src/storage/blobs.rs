//! Object store backends: in-memory, and a content-addressed filesystem layout
//! (`<root>/sha256/aa/bb/<hex>` for bytes, `<root>/files/<file_id>.json` for metadata).

use super::traits::{BlobInfo, BlobStore, BlobUpload, StoredBlob};
use crate::common::error::{FlotaError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn new_info(upload: &BlobUpload) -> BlobInfo {
    BlobInfo {
        file_id: Uuid::new_v4().simple().to_string(),
        filename: upload.filename.clone(),
        content_type: upload.content_type.clone(),
        length: upload.bytes.len() as u64,
        sha256: sha256_hex(&upload.bytes),
        uploaded_at: Utc::now(),
        metadata: upload.metadata.clone(),
    }
}

/// File ids are generated hex strings; anything else never names a stored file
fn is_valid_file_id(file_id: &str) -> bool {
    !file_id.is_empty() && file_id.len() <= 64 && file_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, StoredBlob>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, upload: BlobUpload) -> Result<String> {
        let info = new_info(&upload);
        let file_id = info.file_id.clone();
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| FlotaError::storage("blob store lock poisoned"))?;
        blobs.insert(
            file_id.clone(),
            StoredBlob {
                info,
                bytes: upload.bytes,
            },
        );
        Ok(file_id)
    }

    async fn get(&self, file_id: &str) -> Result<Option<StoredBlob>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| FlotaError::storage("blob store lock poisoned"))?;
        Ok(blobs.get(file_id).cloned())
    }

    async fn delete(&self, file_id: &str) -> Result<bool> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| FlotaError::storage("blob store lock poisoned"))?;
        Ok(blobs.remove(file_id).is_some())
    }
}

/// Filesystem object store. Identical uploads share one content file.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `sha256/aa/bb/<hex>`; rejects anything that is not a hex SHA-256 digest
    fn content_path(&self, hex: &str) -> Result<PathBuf> {
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FlotaError::storage(format!("invalid content digest '{hex}'")));
        }
        Ok(self
            .root
            .join("sha256")
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(hex))
    }

    fn meta_path(&self, file_id: &str) -> PathBuf {
        self.root.join("files").join(format!("{file_id}.json"))
    }

    /// Write bytes under their digest, skipping the write when already present
    async fn write_cas(&self, hex: &str, bytes: &[u8]) -> Result<()> {
        let path = self.content_path(hex)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        if !fs::try_exists(&path).await? {
            fs::write(&path, bytes).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, upload: BlobUpload) -> Result<String> {
        let info = new_info(&upload);
        self.write_cas(&info.sha256, &upload.bytes).await?;

        let meta_path = self.meta_path(&info.file_id);
        if let Some(dir) = meta_path.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(&meta_path, serde_json::to_vec_pretty(&info)?).await?;

        info!(
            "Stored {} ({} bytes) as cas:sha256:{}",
            info.filename, info.length, info.sha256
        );
        Ok(info.file_id)
    }

    async fn get(&self, file_id: &str) -> Result<Option<StoredBlob>> {
        if !is_valid_file_id(file_id) {
            return Ok(None);
        }
        let meta_path = self.meta_path(file_id);
        if !fs::try_exists(&meta_path).await? {
            return Ok(None);
        }
        let info: BlobInfo = serde_json::from_slice(&fs::read(&meta_path).await?)?;
        let bytes = fs::read(self.content_path(&info.sha256)?).await?;
        Ok(Some(StoredBlob { info, bytes }))
    }

    /// Removes the file id; content bytes may be shared and are kept
    async fn delete(&self, file_id: &str) -> Result<bool> {
        if !is_valid_file_id(file_id) {
            return Ok(false);
        }
        match fs::remove_file(self.meta_path(file_id)).await {
            Ok(()) => {
                debug!("Deleted blob {}", file_id);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Document;

    fn upload(bytes: &[u8]) -> BlobUpload {
        BlobUpload {
            filename: "poliza.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: bytes.to_vec(),
            metadata: Document::new(),
        }
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let id = store.put(upload(b"%PDF-1.4 hola")).await.unwrap();
        let blob = store.get(&id).await.unwrap().unwrap();
        assert_eq!(blob.bytes, b"%PDF-1.4 hola");
        assert_eq!(blob.info.filename, "poliza.pdf");
        assert_eq!(blob.info.length, 13);

        let hex = &blob.info.sha256;
        assert!(dir
            .path()
            .join("sha256")
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(hex)
            .exists());

        assert!(store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(!store.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_fs_store_shares_content_and_rejects_bad_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let a = store.put(upload(b"same")).await.unwrap();
        let b = store.put(upload(b"same")).await.unwrap();
        assert_ne!(a, b);

        store.delete(&a).await.unwrap();
        assert_eq!(store.get(&b).await.unwrap().unwrap().bytes, b"same");

        assert!(store.get("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_store_rejects_malformed_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let id = store.put(upload(b"%PDF")).await.unwrap();

        let meta_path = dir.path().join("files").join(format!("{id}.json"));
        let mut info: BlobInfo = serde_json::from_slice(&std::fs::read(&meta_path).unwrap()).unwrap();
        for digest in ["ñññ", "..", "zz".repeat(32).as_str()] {
            info.sha256 = digest.to_string();
            std::fs::write(&meta_path, serde_json::to_vec(&info).unwrap()).unwrap();
            assert!(matches!(store.get(&id).await, Err(FlotaError::Storage { .. })));
        }
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryBlobStore::new();
        let id = store.put(upload(b"x")).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().info.content_type, "application/pdf");
        assert!(store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
    }
}
