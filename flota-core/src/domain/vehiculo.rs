use serde::{Deserialize, Serialize};

/// A digital document attached to a vehicle (cédula, VTV scan, policy, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentoDigital {
    pub tipo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_archivo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_esperado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_archivo_patron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existe_fisicamente: Option<bool>,
}

/// Reconciled vehicle as exposed by the API. The stored document may carry
/// any mix of legacy UPPER and lowercase keys; see `reconcile::vehiculo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehiculo {
    /// Normalized plate, also the document id
    #[serde(rename = "_id", alias = "patente")]
    pub patente: String,
    pub patente_original: Option<String>,
    pub activo: bool,
    pub anio: Option<i32>,
    pub color: Option<String>,
    pub modelo: Option<String>,
    pub descripcion_modelo: Option<String>,
    pub nro_movil: Option<String>,
    pub tipo_combustible: Option<String>,
    pub tipo: Option<String>,
    pub area: Option<String>,
    pub ubicacion: Option<String>,
    pub responsable: Option<String>,
    pub clave_radio: Option<String>,
    pub medidas_cubiertas: Option<String>,
    pub costo_adquisicion: Option<f64>,
    #[serde(default)]
    pub documentos_digitales: Vec<DocumentoDigital>,
}

fn default_activo() -> bool {
    true
}

fn default_combustible() -> Option<String> {
    Some("Nafta".to_string())
}

/// Payload for `POST /vehiculos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiculoInput {
    pub patente: String,
    #[serde(default = "default_activo")]
    pub activo: bool,
    #[serde(default)]
    pub anio: Option<i32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub modelo: Option<String>,
    #[serde(default)]
    pub descripcion_modelo: Option<String>,
    #[serde(default)]
    pub nro_movil: Option<String>,
    #[serde(default = "default_combustible")]
    pub tipo_combustible: Option<String>,
}

/// Payload for `PATCH`/`PUT /vehiculos/{patente}`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehiculoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anio: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion_modelo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nro_movil: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_combustible: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsable: Option<String>,
}
