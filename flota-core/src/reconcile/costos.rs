//! The two expense sources, `Mantenimiento` and `Finanzas`, mapped into one
//! [`CostoItem`] shape, plus the unified view and the period report built on it.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{coalesce, coalesce_f64, coalesce_str, document_id, fechas::parse_fecha, fold, round2};
use crate::constants::ADMIN_KEYWORDS;
use crate::domain::{CostoItem, CostoValidado, GastosUnificados, Origen, ReporteCostos};
use crate::storage::Document;

const MANT_FECHA: &[&str] = &["fecha", "FECHA"];
const MANT_MONTO: &[&str] = &["costo_monto", "COSTO_MONTO", "importe"];
const MANT_TIPO: &[&str] = &["tipo_costo", "motivo", "tipo_registro"];
const MANT_DESCRIPCION: &[&str] = &["descripcion", "DESCRIPCIN", "DESCRIPCION", "OBSERVACIONES"];

const FIN_FECHA: &[&str] = &["dia", "FECHA_INFRACCION", "fecha_infraccion", "fecha"];
const FIN_MONTO: &[&str] = &["monto", "MONTO", "importe"];
const FIN_TIPO: &[&str] = &["tipo_costo", "tipo_registro"];
const FIN_DESCRIPCION: &[&str] = &["motivo", "MOTIVO", "ACTA", "descripcion"];

const MAX_DESCRIPCION_FINANZAS: usize = 100;

/// Amount keys a document of this origin may carry, preferred first
pub fn monto_keys(origen: Origen) -> &'static [&'static str] {
    match origen {
        Origen::Mantenimiento => MANT_MONTO,
        Origen::Finanzas => FIN_MONTO,
    }
}

/// The amount field an update should write: whichever key the document already
/// uses, otherwise the native field of the origin.
pub fn monto_field(origen: Origen, doc: &Document) -> &'static str {
    let keys = monto_keys(origen);
    keys.iter()
        .copied()
        .find(|k| doc.contains_key(*k))
        .unwrap_or(keys[0])
}

/// True when the stored amount is literally the number zero. Blank or
/// unparseable amounts do not count; those are legacy rows, not garbage.
pub fn monto_raw_es_cero(origen: Origen, doc: &Document) -> bool {
    matches!(
        doc.get(monto_field(origen, doc)),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0)
    )
}

/// Map one raw expense document. `None` when it has no usable date.
pub fn costo_from_document(origen: Origen, doc: &Document) -> Option<CostoItem> {
    match origen {
        Origen::Mantenimiento => costo_from_mantenimiento(doc),
        Origen::Finanzas => costo_from_finanzas(doc),
    }
}

fn costo_from_mantenimiento(doc: &Document) -> Option<CostoItem> {
    let fecha = coalesce(doc, MANT_FECHA).and_then(parse_fecha)?;
    Some(CostoItem {
        id: document_id(doc).unwrap_or_default(),
        tipo: coalesce_str(doc, MANT_TIPO).unwrap_or_else(|| "Mantenimiento General".to_string()),
        fecha,
        descripcion: coalesce_str(doc, MANT_DESCRIPCION)
            .unwrap_or_else(|| "Servicio técnico".to_string()),
        importe: coalesce_f64(doc, MANT_MONTO).unwrap_or(0.0),
        origen: Origen::Mantenimiento,
        comprobante_file_id: coalesce_str(doc, &["comprobante_file_id"]),
    })
}

fn costo_from_finanzas(doc: &Document) -> Option<CostoItem> {
    let fecha = coalesce(doc, FIN_FECHA).and_then(parse_fecha)?;
    let es_infraccion = coalesce_str(doc, &["tipo_registro"])
        .map(|t| fold(&t) == "infraccion")
        .unwrap_or(false);
    let tipo = if es_infraccion {
        "Infracción".to_string()
    } else {
        coalesce_str(doc, FIN_TIPO).unwrap_or_else(|| "Otros".to_string())
    };
    let descripcion: String = coalesce_str(doc, FIN_DESCRIPCION)
        .unwrap_or_else(|| "Sin descripción".to_string())
        .chars()
        .take(MAX_DESCRIPCION_FINANZAS)
        .collect();

    Some(CostoItem {
        id: document_id(doc).unwrap_or_default(),
        tipo,
        fecha,
        descripcion,
        importe: coalesce_f64(doc, FIN_MONTO).unwrap_or(0.0),
        origen: Origen::Finanzas,
        comprobante_file_id: coalesce_str(doc, &["comprobante_file_id"]),
    })
}

/// Map every document of both sources; returns the items and how many
/// documents were skipped for lack of a date.
pub fn map_costos(mantenimiento: &[Document], finanzas: &[Document]) -> (Vec<CostoItem>, usize) {
    let sources = [
        (Origen::Mantenimiento, mantenimiento),
        (Origen::Finanzas, finanzas),
    ];
    let mut items = Vec::new();
    let mut omitidos = 0;
    for (origen, docs) in sources {
        for doc in docs {
            match costo_from_document(origen, doc) {
                Some(item) => items.push(item),
                None => omitidos += 1,
            }
        }
    }
    (items, omitidos)
}

pub fn es_administrativo(descripcion: &str) -> bool {
    let folded = fold(descripcion);
    ADMIN_KEYWORDS.iter().any(|k| folded.contains(k))
}

/// Fines are reported under any of `Multa`, `INFRACCION`, `Infracción`
pub fn es_multa(tipo: &str) -> bool {
    matches!(fold(tipo).as_str(), "multa" | "infraccion")
}

fn ordenar(items: &mut [CostoItem]) {
    items.sort_by(|a, b| b.fecha.cmp(&a.fecha).then_with(|| a.id.cmp(&b.id)));
}

/// Unified expense view for one vehicle
pub fn unificar(patente: &str, mantenimiento: &[Document], finanzas: &[Document]) -> GastosUnificados {
    let (items, _) = map_costos(mantenimiento, finanzas);
    let mut gastos: Vec<CostoItem> = items
        .into_iter()
        .filter(|c| c.importe > 0.0 && !es_administrativo(&c.descripcion))
        .collect();
    ordenar(&mut gastos);

    let total_general: f64 = gastos.iter().map(|c| c.importe).sum();
    let total_mantenimiento: f64 = gastos
        .iter()
        .filter(|c| c.origen == Origen::Mantenimiento)
        .map(|c| c.importe)
        .sum();
    let total_multas: f64 = gastos
        .iter()
        .filter(|c| c.origen == Origen::Finanzas && es_multa(&c.tipo))
        .map(|c| c.importe)
        .sum();

    GastosUnificados {
        patente: patente.to_string(),
        gastos,
        total_general: round2(total_general),
        total_mantenimiento: round2(total_mantenimiento),
        total_multas: round2(total_multas),
        total_otras: round2(total_general - total_mantenimiento - total_multas),
    }
}

/// Period report over an inclusive date range. Alerts are attached by the caller.
pub fn reporte_periodo(
    patente: &str,
    mantenimiento: &[Document],
    finanzas: &[Document],
    desde: NaiveDate,
    hasta: NaiveDate,
) -> ReporteCostos {
    let (items, omitidos) = map_costos(mantenimiento, finanzas);
    let mut detalles: Vec<CostoItem> = items
        .into_iter()
        .filter(|c| c.fecha >= desde && c.fecha <= hasta)
        .collect();
    ordenar(&mut detalles);

    let mut total_mantenimiento = 0.0;
    let mut total_infracciones = 0.0;
    let mut total_otros = 0.0;
    for item in &detalles {
        match item.origen {
            Origen::Mantenimiento => total_mantenimiento += item.importe,
            Origen::Finanzas if es_multa(&item.tipo) => total_infracciones += item.importe,
            Origen::Finanzas => total_otros += item.importe,
        }
    }

    ReporteCostos {
        patente: patente.to_string(),
        fecha_inicio: desde,
        fecha_fin: hasta,
        total_mantenimiento: round2(total_mantenimiento),
        total_infracciones: round2(total_infracciones),
        total_otros: round2(total_otros),
        total_general: round2(total_mantenimiento + total_infracciones + total_otros),
        detalles,
        alertas: Vec::new(),
        omitidos,
    }
}

/// Stored form of a manual cost. Writes the native fields of its origin and
/// the generic ones, so every reader sees the same values.
pub fn documento_costo_manual(id: &str, costo: &CostoValidado, file_id: Option<&str>) -> Document {
    let fecha = costo.fecha.format("%Y-%m-%d").to_string();
    let mut doc = Document::new();
    doc.insert("_id".into(), json!(id));
    doc.insert("patente".into(), json!(costo.patente));
    doc.insert("tipo_costo".into(), json!(costo.tipo_costo));
    doc.insert("fecha".into(), json!(fecha));
    doc.insert("descripcion".into(), json!(costo.descripcion));
    doc.insert("importe".into(), json!(costo.importe));
    doc.insert("origen".into(), json!(costo.origen.collection()));
    doc.insert("es_manual".into(), json!(true));
    doc.insert("comprobante_file_id".into(), json!(file_id));
    match costo.origen {
        Origen::Mantenimiento => {
            doc.insert("costo_monto".into(), json!(costo.importe));
            doc.insert("motivo".into(), json!(costo.tipo_costo));
        }
        Origen::Finanzas => {
            doc.insert("monto".into(), json!(costo.importe));
            doc.insert("dia".into(), json!(fecha));
            doc.insert("tipo_registro".into(), json!(costo.tipo_costo));
            doc.insert("motivo".into(), json!(costo.descripcion));
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mantenimiento_mapping_and_fallbacks() {
        let item = costo_from_document(
            Origen::Mantenimiento,
            &doc(json!({"_id": "m1", "FECHA": "15/03/2024", "COSTO_MONTO": "25000,5"})),
        )
        .unwrap();
        assert_eq!(item.fecha, ymd(2024, 3, 15));
        assert_eq!(item.importe, 25000.5);
        assert_eq!(item.tipo, "Mantenimiento General");
        assert_eq!(item.descripcion, "Servicio técnico");

        let nan = costo_from_document(
            Origen::Mantenimiento,
            &doc(json!({"_id": "m2", "fecha": "2024-01-01", "costo_monto": "NaN"})),
        )
        .unwrap();
        assert_eq!(nan.importe, 0.0);
    }

    #[test]
    fn test_finanzas_mapping() {
        let largo = "x".repeat(150);
        let item = costo_from_document(
            Origen::Finanzas,
            &doc(json!({
                "_id": "f1",
                "dia": "2024-05-02",
                "MONTO": 18000,
                "tipo_registro": "INFRACCION",
                "MOTIVO": largo
            })),
        )
        .unwrap();
        assert_eq!(item.tipo, "Infracción");
        assert_eq!(item.importe, 18000.0);
        assert_eq!(item.descripcion.chars().count(), 100);

        let otro = costo_from_document(
            Origen::Finanzas,
            &doc(json!({"_id": "f2", "fecha": "2024-05-02", "monto": 10})),
        )
        .unwrap();
        assert_eq!(otro.tipo, "Otros");
        assert_eq!(otro.descripcion, "Sin descripción");
    }

    #[test]
    fn test_undated_documents_are_skipped() {
        let mant = vec![doc(json!({"_id": "m1", "costo_monto": 100}))];
        let fin = vec![doc(json!({"_id": "f1", "dia": "2024-01-02", "monto": 5}))];
        let (items, omitidos) = map_costos(&mant, &fin);
        assert_eq!(items.len(), 1);
        assert_eq!(omitidos, 1);
    }

    #[test]
    fn test_unified_view_filters_and_totals() {
        let mant = vec![
            doc(json!({"_id": "m1", "fecha": "2024-02-01", "costo_monto": 1000.456})),
            doc(json!({"_id": "m2", "fecha": "2024-03-01", "costo_monto": 0})),
            doc(json!({"_id": "m3", "fecha": "2024-04-01", "costo_monto": 50, "descripcion": "Corrección de saldo"})),
        ];
        let fin = vec![
            doc(json!({"_id": "f1", "dia": "2024-05-01", "monto": 300, "tipo_registro": "INFRACCION"})),
            doc(json!({"_id": "f2", "dia": "2024-01-01", "monto": 200, "tipo_registro": "PEAJE"})),
        ];
        let view = unificar("AB123CD", &mant, &fin);
        let ids: Vec<&str> = view.gastos.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "m1", "f2"]);
        assert_eq!(view.total_general, 1500.46);
        assert_eq!(view.total_mantenimiento, 1000.46);
        assert_eq!(view.total_multas, 300.0);
        assert_eq!(view.total_otras, 200.0);
    }

    #[test]
    fn test_period_report_is_inclusive() {
        let mant = vec![
            doc(json!({"_id": "m1", "fecha": "2024-01-01", "costo_monto": 100})),
            doc(json!({"_id": "m2", "fecha": "2023-12-31", "costo_monto": 999})),
        ];
        let fin = vec![
            doc(json!({"_id": "f1", "dia": "2024-06-30", "monto": 40, "tipo_registro": "Infraccion"})),
            doc(json!({"_id": "f2", "dia": "2024-03-10", "monto": 60, "tipo_costo": "Patente"})),
            doc(json!({"_id": "f3", "monto": 1})),
        ];
        let r = reporte_periodo("AB123CD", &mant, &fin, ymd(2024, 1, 1), ymd(2024, 6, 30));
        assert_eq!(r.detalles.len(), 3);
        assert_eq!(r.detalles[0].id, "f1");
        assert_eq!(r.total_mantenimiento, 100.0);
        assert_eq!(r.total_infracciones, 40.0);
        assert_eq!(r.total_otros, 60.0);
        assert_eq!(r.total_general, 200.0);
        assert_eq!(r.omitidos, 1);
    }

    #[test]
    fn test_monto_field_and_zero_detection() {
        let legacy = doc(json!({"COSTO_MONTO": 0}));
        assert_eq!(monto_field(Origen::Mantenimiento, &legacy), "COSTO_MONTO");
        assert!(monto_raw_es_cero(Origen::Mantenimiento, &legacy));

        let empty = doc(json!({}));
        assert_eq!(monto_field(Origen::Finanzas, &empty), "monto");
        assert!(!monto_raw_es_cero(Origen::Finanzas, &empty));
        assert!(!monto_raw_es_cero(Origen::Finanzas, &doc(json!({"monto": "0"}))));
    }

    #[test]
    fn test_manual_document_is_readable_back() {
        let costo = CostoValidado {
            patente: "AB123CD".into(),
            tipo_costo: "Multa".into(),
            fecha: ymd(2025, 2, 3),
            descripcion: "Exceso de velocidad".into(),
            importe: 45000.0,
            origen: Origen::Finanzas,
        };
        let stored = documento_costo_manual("c1", &costo, Some("file-1"));
        let item = costo_from_document(Origen::Finanzas, &stored).unwrap();
        assert_eq!(item.id, "c1");
        assert_eq!(item.tipo, "Multa");
        assert_eq!(item.importe, 45000.0);
        assert_eq!(item.descripcion, "Exceso de velocidad");
        assert_eq!(item.comprobante_file_id.as_deref(), Some("file-1"));
        assert!(es_multa(&item.tipo));
    }
}
