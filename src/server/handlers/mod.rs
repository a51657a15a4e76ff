pub mod archivos;
pub mod costos;
pub mod documentacion;
pub mod polizas;
pub mod reportes;
pub mod sistema;
pub mod vehiculos;

use chrono::{Local, NaiveDate};
use flota_core::reconcile::fechas::parse_fecha_str;

use crate::error::{ApiError, ApiResult};

pub(crate) fn hoy() -> NaiveDate {
    Local::now().date_naive()
}

/// Optional date query parameter; present but unparseable is a 400
pub(crate) fn fecha_param(nombre: &str, valor: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match valor.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => parse_fecha_str(v)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Fecha inválida en {nombre}: '{v}'"))),
    }
}
