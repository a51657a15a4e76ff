//! `Documentacion` and `polizas_seguros` records.

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{coalesce, coalesce_str, document_id, fechas::parse_fecha, patente::normalize_patente};
use crate::domain::{Documento, DocumentoCreate, Poliza};
use crate::storage::Document;

pub fn documento_from_document(doc: &Document) -> Option<Documento> {
    Some(Documento {
        id: document_id(doc)?,
        patente: normalize_patente(&coalesce_str(doc, &["patente", "PATENTE"]).unwrap_or_default()),
        tipo_documento: coalesce_str(doc, &["tipo_documento", "TIPO_DOCUMENTO"])?,
        fecha_vencimiento: coalesce(doc, &["fecha_vencimiento", "FECHA_VENCIMIENTO"])
            .and_then(parse_fecha),
        aseguradora: coalesce_str(doc, &["aseguradora", "ASEGURADORA"]),
        numero_poliza: coalesce_str(doc, &["numero_poliza", "NUMERO_POLIZA"]),
        filename: coalesce_str(doc, &["filename"]),
        file_id: coalesce_str(doc, &["file_id"]),
    })
}

/// Stored form of a new expiry record. The expiry is kept as `YYYY-MM-DD`
/// when it parses and verbatim otherwise.
pub fn nuevo_documento(id: &str, patente: &str, input: &DocumentoCreate) -> Document {
    let fecha = input.fecha_vencimiento.as_deref().map(|raw| {
        parse_fecha(&json!(raw))
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| raw.trim().to_string())
    });

    let mut doc = Document::new();
    doc.insert("_id".into(), json!(id));
    doc.insert("patente".into(), json!(patente));
    doc.insert("tipo_documento".into(), json!(input.tipo_documento.trim()));
    doc.insert("fecha_vencimiento".into(), json!(fecha));
    doc.insert("aseguradora".into(), json!(input.aseguradora));
    doc.insert("numero_poliza".into(), json!(input.numero_poliza));
    doc
}

pub fn poliza_from_document(doc: &Document) -> Option<Poliza> {
    let fecha_subida = coalesce_str(doc, &["fecha_subida"])
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default();

    Some(Poliza {
        id: document_id(doc)?,
        empresa: coalesce_str(doc, &["empresa"]).unwrap_or_default(),
        numero_poliza: coalesce_str(doc, &["numero_poliza"])?,
        filename: coalesce_str(doc, &["filename"]).unwrap_or_default(),
        file_id: coalesce_str(doc, &["file_id"]).unwrap_or_default(),
        fecha_subida,
    })
}

pub fn poliza_document(poliza: &Poliza) -> Document {
    let mut doc = Document::new();
    doc.insert("_id".into(), json!(poliza.id));
    doc.insert("empresa".into(), json!(poliza.empresa));
    doc.insert("numero_poliza".into(), json!(poliza.numero_poliza));
    doc.insert("filename".into(), json!(poliza.filename));
    doc.insert("file_id".into(), json!(poliza.file_id));
    doc.insert("fecha_subida".into(), json!(poliza.fecha_subida.to_rfc3339()));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_documento_mapping() {
        let d = documento_from_document(&doc(json!({
            "_id": 7,
            "PATENTE": "ab 123 cd",
            "tipo_documento": "VTV",
            "fecha_vencimiento": "01/02/2026"
        })))
        .unwrap();
        assert_eq!(d.id, "7");
        assert_eq!(d.patente, "AB123CD");
        assert_eq!(d.fecha_vencimiento, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert!(documento_from_document(&doc(json!({"_id": "x"}))).is_none());
    }

    #[test]
    fn test_nuevo_documento_normalizes_date() {
        let input = DocumentoCreate {
            tipo_documento: "GAS".into(),
            fecha_vencimiento: Some("5/3/2026".into()),
            aseguradora: None,
            numero_poliza: None,
        };
        let stored = nuevo_documento("d1", "AB123CD", &input);
        assert_eq!(stored["fecha_vencimiento"], "2026-03-05");
    }

    #[test]
    fn test_poliza_round_trip_through_document() {
        let poliza = Poliza {
            id: "p1".into(),
            empresa: "La Segunda".into(),
            numero_poliza: "123-A".into(),
            filename: "poliza.pdf".into(),
            file_id: "f1".into(),
            fecha_subida: DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        assert_eq!(poliza_from_document(&poliza_document(&poliza)), Some(poliza));
    }
}
