use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::Alerta;
use crate::common::error::{FlotaError, Result};
use crate::constants::{FINANZAS, MANTENIMIENTO};
use crate::reconcile::patente::normalize_patente;

/// Which of the two expense collections a cost lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Origen {
    Mantenimiento,
    Finanzas,
}

impl Origen {
    pub const ALL: [Origen; 2] = [Origen::Finanzas, Origen::Mantenimiento];

    /// Name of the backing collection
    pub fn collection(&self) -> &'static str {
        match self {
            Origen::Mantenimiento => MANTENIMIENTO,
            Origen::Finanzas => FINANZAS,
        }
    }

    /// Accepts the collection names and the `costos`/`finanzas` spelling the
    /// universal delete endpoint uses, case-insensitively.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "mantenimiento" | "costos" => Some(Origen::Mantenimiento),
            "finanzas" => Some(Origen::Finanzas),
            _ => None,
        }
    }
}

impl fmt::Display for Origen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.collection())
    }
}

impl FromStr for Origen {
    type Err = FlotaError;

    /// Strict form: exactly `Finanzas` or `Mantenimiento`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            MANTENIMIENTO => Ok(Origen::Mantenimiento),
            FINANZAS => Ok(Origen::Finanzas),
            _ => Err(FlotaError::validation(
                "Origen debe ser 'Finanzas' o 'Mantenimiento'",
            )),
        }
    }
}

/// One expense row of the unified display model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostoItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub tipo: String,
    pub fecha: NaiveDate,
    pub descripcion: String,
    pub importe: f64,
    pub origen: Origen,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comprobante_file_id: Option<String>,
}

/// Manual cost as submitted by a user, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuevoCosto {
    pub patente: String,
    pub tipo_costo: String,
    pub fecha: String,
    pub descripcion: String,
    pub importe: f64,
    pub origen: String,
}

/// A manual cost that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct CostoValidado {
    pub patente: String,
    pub tipo_costo: String,
    pub fecha: NaiveDate,
    pub descripcion: String,
    pub importe: f64,
    pub origen: Origen,
}

impl NuevoCosto {
    /// Checks run both by the client before submitting and by the server on receipt
    pub fn validate(&self) -> Result<CostoValidado> {
        let patente = normalize_patente(&self.patente);
        if patente.is_empty() {
            return Err(FlotaError::validation("La patente es obligatoria"));
        }
        let fecha = NaiveDate::parse_from_str(self.fecha.trim(), "%Y-%m-%d").map_err(|_| {
            FlotaError::validation("Fecha inválida (formato YYYY-MM-DD requerido)")
        })?;
        if !self.importe.is_finite() || self.importe <= 0.0 {
            return Err(FlotaError::validation("Importe debe ser mayor a 0"));
        }
        let origen: Origen = self.origen.trim().parse()?;
        let tipo_costo = self.tipo_costo.trim();
        if tipo_costo.is_empty() {
            return Err(FlotaError::validation("El tipo de costo es obligatorio"));
        }

        Ok(CostoValidado {
            patente,
            tipo_costo: tipo_costo.to_string(),
            fecha,
            descripcion: self.descripcion.trim().to_string(),
            importe: self.importe,
            origen,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCostoResponse {
    pub message: String,
    pub costo_id: String,
    pub file_id: Option<String>,
}

/// Both expense sources merged for one vehicle, bookkeeping rows removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GastosUnificados {
    pub patente: String,
    pub gastos: Vec<CostoItem>,
    pub total_general: f64,
    pub total_mantenimiento: f64,
    pub total_multas: f64,
    pub total_otras: f64,
}

/// Period report for one vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporteCostos {
    pub patente: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub total_mantenimiento: f64,
    pub total_infracciones: f64,
    pub total_otros: f64,
    pub total_general: f64,
    pub detalles: Vec<CostoItem>,
    #[serde(default)]
    pub alertas: Vec<Alerta>,
    /// Source documents dropped because they had no usable date
    #[serde(default)]
    pub omitidos: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumenCostos {
    pub total_mantenimiento: f64,
    pub total_infracciones: f64,
    pub total_general: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_vehiculos: usize,
    pub vehiculos_activos: usize,
    pub alertas_criticas: Vec<Alerta>,
    pub alertas_criticas_count: usize,
    pub resumen_costos: ResumenCostos,
}

/// Body of `PATCH /monto/{coleccion}/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMonto {
    pub monto: f64,
    #[serde(default)]
    pub motivo: Option<String>,
}

impl UpdateMonto {
    pub const MAX_MOTIVO: usize = 500;

    pub fn validate(&self) -> Result<()> {
        if !self.monto.is_finite() || self.monto <= 0.0 {
            return Err(FlotaError::validation("El monto debe ser mayor que cero"));
        }
        if let Some(motivo) = &self.motivo {
            if motivo.chars().count() > Self::MAX_MOTIVO {
                return Err(FlotaError::validation(format!(
                    "El motivo no puede superar {} caracteres",
                    Self::MAX_MOTIVO
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontoActualizado {
    pub message: String,
    pub modified: bool,
    /// Amount field that was written
    pub campo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimpiezaResultado {
    pub mensaje: String,
    pub total_eliminados: usize,
    pub detalles_por_coleccion: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costo(importe: f64) -> NuevoCosto {
        NuevoCosto {
            patente: "ab 123 cd".to_string(),
            tipo_costo: "Neumático".to_string(),
            fecha: "2025-03-14".to_string(),
            descripcion: " Cambio de cubiertas ".to_string(),
            importe,
            origen: "Mantenimiento".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_and_normalizes() {
        let ok = costo(1500.0).validate().unwrap();
        assert_eq!(ok.patente, "AB123CD");
        assert_eq!(ok.origen, Origen::Mantenimiento);
        assert_eq!(ok.descripcion, "Cambio de cubiertas");
        assert_eq!(ok.fecha, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn test_validate_blocks_non_positive_importe() {
        for importe in [0.0, -10.0, f64::NAN] {
            let err = costo(importe).validate().unwrap_err();
            assert!(matches!(err, FlotaError::Validation(_)));
            assert_eq!(err.to_string(), "Importe debe ser mayor a 0");
        }
    }

    #[test]
    fn test_validate_rejects_bad_fecha_and_origen() {
        let mut c = costo(10.0);
        c.fecha = "14/03/2025".to_string();
        assert!(c.validate().is_err());

        let mut c = costo(10.0);
        c.origen = "costos".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_origen_lenient_parsing() {
        assert_eq!(Origen::parse_lenient("costos"), Some(Origen::Mantenimiento));
        assert_eq!(Origen::parse_lenient("FINANZAS"), Some(Origen::Finanzas));
        assert_eq!(Origen::parse_lenient("multas"), None);
    }

    #[test]
    fn test_update_monto_limits() {
        assert!(UpdateMonto { monto: 1.0, motivo: None }.validate().is_ok());
        assert!(UpdateMonto { monto: 0.0, motivo: None }.validate().is_err());
        let largo = "x".repeat(501);
        assert!(UpdateMonto { monto: 1.0, motivo: Some(largo) }.validate().is_err());
    }
}
