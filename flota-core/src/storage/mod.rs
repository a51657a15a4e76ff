pub mod blobs;
pub mod in_memory;
pub mod traits;

#[cfg(feature = "db")]
pub mod database;

pub use blobs::{FsBlobStore, InMemoryBlobStore};
pub use in_memory::InMemoryStorage;
pub use traits::{BlobInfo, BlobStore, BlobUpload, Document, Filter, Storage, StoredBlob};

#[cfg(feature = "db")]
pub use database::DatabaseStorage;
