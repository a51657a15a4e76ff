//! Raw `Vehiculos` documents to [`Vehiculo`] and back to legacy-keyed fields.

use serde_json::{json, Value};

use super::{coalesce_bool, coalesce_f64, coalesce_str, patente::normalize_patente};
use crate::common::error::{FlotaError, Result};
use crate::constants::TIPO_REGISTRO_MANUAL;
use crate::domain::{DocumentoDigital, Vehiculo, VehiculoInput, VehiculoUpdate};
use crate::storage::Document;

/// Key lists per display field, legacy UPPER key first
const ANIO: &[&str] = &["ANIO", "anio", "AÑO"];
const COLOR: &[&str] = &["COLOR", "color"];
const MODELO: &[&str] = &["MODELO", "modelo"];
const DESCRIPCION_MODELO: &[&str] = &["DESCRIPCION_MODELO", "descripcion_modelo"];
const NRO_MOVIL: &[&str] = &["NRO_MOVIL", "nro_movil"];
const TIPO_COMBUSTIBLE: &[&str] = &["TIPO_COMBUSTIBLE", "tipo_combustible"];
const TIPO: &[&str] = &["TIPO", "tipo"];
const AREA: &[&str] = &["AREA", "area"];
const UBICACION: &[&str] = &["UBICACION", "ubicacion"];
const RESPONSABLE: &[&str] = &["RESPONSABLE", "responsable"];
const CLAVE_RADIO: &[&str] = &["CLAVE_RADIO", "clave_radio"];
const MEDIDAS_CUBIERTAS: &[&str] = &["MEDIDAS_CUBIERTAS", "medidas_cubiertas"];
const COSTO_ADQUISICION: &[&str] = &["COSTO_ADQUISICION", "costo_adquisicion"];
const ACTIVO: &[&str] = &["ACTIVO", "activo"];

/// Build the display model from whatever the store holds
pub fn vehiculo_from_document(doc: &Document) -> Vehiculo {
    let patente = coalesce_str(doc, &["_id", "patente", "PATENTE"]).unwrap_or_default();
    let patente_original = coalesce_str(doc, &["patente_original", "patente", "PATENTE"]);

    Vehiculo {
        patente,
        patente_original,
        activo: coalesce_bool(doc, ACTIVO).unwrap_or(false),
        anio: coalesce_f64(doc, ANIO)
            .map(f64::trunc)
            .filter(|y| *y >= i32::MIN as f64 && *y <= i32::MAX as f64)
            .map(|y| y as i32),
        color: coalesce_str(doc, COLOR),
        modelo: coalesce_str(doc, MODELO),
        descripcion_modelo: coalesce_str(doc, DESCRIPCION_MODELO),
        nro_movil: coalesce_str(doc, NRO_MOVIL),
        tipo_combustible: coalesce_str(doc, TIPO_COMBUSTIBLE),
        tipo: coalesce_str(doc, TIPO),
        area: coalesce_str(doc, AREA),
        ubicacion: coalesce_str(doc, UBICACION),
        responsable: coalesce_str(doc, RESPONSABLE),
        clave_radio: coalesce_str(doc, CLAVE_RADIO),
        medidas_cubiertas: coalesce_str(doc, MEDIDAS_CUBIERTAS),
        costo_adquisicion: coalesce_f64(doc, COSTO_ADQUISICION),
        documentos_digitales: documentos_digitales(doc),
    }
}

/// Entries that cannot be read as a [`DocumentoDigital`] are skipped
pub fn documentos_digitales(doc: &Document) -> Vec<DocumentoDigital> {
    doc.get("documentos_digitales")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Stored form of a vehicle created through the API. Uses the legacy UPPER
/// keys so ETL-loaded and manual vehicles look alike.
pub fn new_vehiculo_document(input: &VehiculoInput) -> Result<Document> {
    let patente = normalize_patente(&input.patente);
    if patente.is_empty() {
        return Err(FlotaError::validation("La patente es obligatoria"));
    }

    let mut doc = Document::new();
    doc.insert("_id".into(), json!(patente));
    doc.insert("patente_original".into(), json!(input.patente.trim().to_uppercase()));
    doc.insert("ACTIVO".into(), json!(input.activo));
    doc.insert("ANIO".into(), json!(input.anio));
    doc.insert("COLOR".into(), json!(input.color));
    doc.insert("MODELO".into(), json!(input.modelo));
    doc.insert("DESCRIPCION_MODELO".into(), json!(input.descripcion_modelo));
    doc.insert("NRO_MOVIL".into(), json!(input.nro_movil));
    doc.insert("TIPO_COMBUSTIBLE".into(), json!(input.tipo_combustible));
    doc.insert("tipo_registro".into(), json!(TIPO_REGISTRO_MANUAL));
    doc.insert("documentos_digitales".into(), json!([]));
    Ok(doc)
}

/// Fields to `$set` for a partial update, keyed the legacy way.
///
/// The lowercase twin of each key is written too, so a stale lowercase value
/// can never shadow the update when the UPPER key is blank.
pub fn update_fields(update: &VehiculoUpdate) -> Document {
    let mut fields = Document::new();
    let mut set = |keys: &[&str], value: Value| {
        for key in keys.iter().take(2) {
            fields.insert((*key).to_string(), value.clone());
        }
    };

    if let Some(activo) = update.activo {
        set(ACTIVO, json!(activo));
    }
    if let Some(anio) = update.anio {
        set(ANIO, json!(anio));
    }
    let texts = [
        (COLOR, &update.color),
        (MODELO, &update.modelo),
        (DESCRIPCION_MODELO, &update.descripcion_modelo),
        (NRO_MOVIL, &update.nro_movil),
        (TIPO_COMBUSTIBLE, &update.tipo_combustible),
        (TIPO, &update.tipo),
        (AREA, &update.area),
        (UBICACION, &update.ubicacion),
        (RESPONSABLE, &update.responsable),
    ];
    for (keys, value) in texts {
        if let Some(value) = value {
            set(keys, json!(value.trim()));
        }
    }
    fields
}
