//! Expiry alerts over `Documentacion` records.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::{coalesce, coalesce_str, fechas::parse_fecha, patente::normalize_patente};
use crate::constants::vencimiento_config;
use crate::domain::{Alerta, Prioridad, Vehiculo};
use crate::storage::Document;

/// Alerts for every expiry record whose date falls inside its window.
///
/// Only types listed in `VENCIMIENTOS` are considered, each with its own
/// critical window. Records are joined with the vehicles list for móvil
/// number and model description.
pub fn calcular_alertas(documentos: &[Document], vehiculos: &[Vehiculo], hoy: NaiveDate) -> Vec<Alerta> {
    let por_patente: HashMap<&str, &Vehiculo> =
        vehiculos.iter().map(|v| (v.patente.as_str(), v)).collect();

    let mut alertas: Vec<Alerta> = documentos
        .iter()
        .filter_map(|doc| {
            let tipo_documento = coalesce_str(doc, &["tipo_documento", "TIPO_DOCUMENTO"])?;
            let cfg = vencimiento_config(&tipo_documento)?;
            let vencimiento = coalesce(doc, &["fecha_vencimiento", "FECHA_VENCIMIENTO"])
                .and_then(parse_fecha)?;

            let dias_restantes = (vencimiento - hoy).num_days();
            if dias_restantes > cfg.dias_critico {
                return None;
            }

            let patente = normalize_patente(&coalesce_str(doc, &["patente", "PATENTE"])?);
            let vehiculo = por_patente.get(patente.as_str());
            let (prioridad, mensaje) = if dias_restantes <= 0 {
                (Prioridad::Critica, "EXPIRADO".to_string())
            } else {
                (Prioridad::Alta, format!("Vence en {} días", dias_restantes))
            };

            Some(Alerta {
                patente,
                tipo_documento,
                nombre_legible: cfg.nombre_legible.to_string(),
                fecha_vencimiento: vencimiento,
                dias_restantes,
                mensaje,
                prioridad,
                movil_nro: vehiculo.and_then(|v| v.nro_movil.clone()),
                descripcion_modelo: vehiculo.and_then(|v| v.descripcion_modelo.clone()),
            })
        })
        .collect();

    alertas.sort_by(|a, b| {
        a.prioridad
            .cmp(&b.prioridad)
            .then(a.dias_restantes.cmp(&b.dias_restantes))
            .then_with(|| a.patente.cmp(&b.patente))
    });
    alertas
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn hoy() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_windows_and_priorities() {
        let docs = vec![
            doc(json!({"patente": "AA111AA", "tipo_documento": "VTV", "fecha_vencimiento": "2025-06-20"})),
            doc(json!({"patente": "BB222BB", "tipo_documento": "Poliza_Detalle", "fecha_vencimiento": "2025-06-20"})),
            doc(json!({"patente": "cc-333-cc", "tipo_documento": "GAS", "fecha_vencimiento": "28/05/2025"})),
            doc(json!({"patente": "DD444DD", "tipo_documento": "TARJ YPF", "fecha_vencimiento": "SIN VENCIMIENTO"})),
        ];
        let vehiculos = vec![Vehiculo {
            patente: "CC333CC".into(),
            nro_movil: Some("21".into()),
            descripcion_modelo: Some("Ranger".into()),
            ..Default::default()
        }];

        let alertas = calcular_alertas(&docs, &vehiculos, hoy());
        assert_eq!(alertas.len(), 2);

        assert_eq!(alertas[0].patente, "CC333CC");
        assert_eq!(alertas[0].prioridad, Prioridad::Critica);
        assert_eq!(alertas[0].mensaje, "EXPIRADO");
        assert_eq!(alertas[0].dias_restantes, -4);
        assert_eq!(alertas[0].movil_nro.as_deref(), Some("21"));
        assert_eq!(alertas[0].nombre_legible, "Oblea GNC");

        assert_eq!(alertas[1].patente, "AA111AA");
        assert_eq!(alertas[1].prioridad, Prioridad::Alta);
        assert_eq!(alertas[1].mensaje, "Vence en 19 días");
    }

    #[test]
    fn test_unknown_types_are_ignored() {
        let docs = vec![
            doc(json!({"patente": "AA111AA", "tipo_documento": "Cedula Verde", "fecha_vencimiento": "2025-06-06"})),
            doc(json!({"patente": "AA111AA", "tipo_documento": "vtv", "fecha_vencimiento": "2025-05-01"})),
            doc(json!({"patente": "AA111AA", "tipo_documento": "VTV", "fecha_vencimiento": "2025-06-06"})),
        ];
        let alertas = calcular_alertas(&docs, &[], hoy());
        assert_eq!(alertas.len(), 1);
        assert_eq!(alertas[0].tipo_documento, "VTV");
        assert_eq!(alertas[0].movil_nro, None);
    }

    #[test]
    fn test_expiry_today_is_critical() {
        let docs = vec![doc(json!({
            "patente": "AA111AA",
            "tipo_documento": "VTV",
            "fecha_vencimiento": {"$date": "2025-06-01T00:00:00Z"}
        }))];
        let alertas = calcular_alertas(&docs, &[], hoy());
        assert_eq!(alertas[0].prioridad, Prioridad::Critica);
        assert_eq!(alertas[0].dias_restantes, 0);
    }
}
