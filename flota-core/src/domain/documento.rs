use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Expiry record from the `Documentacion` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documento {
    pub id: String,
    pub patente: String,
    pub tipo_documento: String,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub aseguradora: Option<String>,
    pub numero_poliza: Option<String>,
    pub filename: Option<String>,
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentoCreate {
    pub tipo_documento: String,
    #[serde(default)]
    pub fecha_vencimiento: Option<String>,
    #[serde(default)]
    pub aseguradora: Option<String>,
    #[serde(default)]
    pub numero_poliza: Option<String>,
}

/// New expiry date in any format `reconcile::fechas` understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VencimientoUpdate {
    pub fecha_vencimiento: String,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mensaje {
    pub message: String,
}

impl Mensaje {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentoCreado {
    pub id: String,
    pub message: String,
}

/// Result of storing a file under the media root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivoSubido {
    pub message: String,
    pub patente: String,
    pub filename: String,
    pub path_relativo: String,
    /// Whether the file was also listed in the vehicle's digital documents
    pub registrado_en_vehiculo: bool,
}
