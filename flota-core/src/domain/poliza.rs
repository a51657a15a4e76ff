use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Insurance policy record; the scanned document lives in the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poliza {
    pub id: String,
    pub empresa: String,
    pub numero_poliza: String,
    pub filename: String,
    pub file_id: String,
    pub fecha_subida: DateTime<Utc>,
}
