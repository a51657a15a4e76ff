use axum::{
    extract::{Path, State},
    Json,
};
use flota_core::{Alerta, Dashboard, ReporteCostos};
use serde::Deserialize;

use super::{fecha_param, hoy};
use crate::app::reportes_use_case::DIAS_ALERTA_DASHBOARD;
use crate::error::ApiResult;
use crate::server::extract::ApiQuery;
use crate::server::state::AppState;

/// Both report routes: `start_date`/`end_date` or `fecha_inicio`/`fecha_fin`
#[derive(Debug, Deserialize)]
pub struct PeriodoQuery {
    #[serde(alias = "fecha_inicio")]
    pub start_date: Option<String>,
    #[serde(alias = "fecha_fin")]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlertasQuery {
    pub dias: Option<i64>,
}

pub async fn reporte_vehiculo(
    State(state): State<AppState>,
    Path(patente): Path<String>,
    ApiQuery(q): ApiQuery<PeriodoQuery>,
) -> ApiResult<Json<ReporteCostos>> {
    let desde = fecha_param("start_date", q.start_date.as_deref())?;
    let hasta = fecha_param("end_date", q.end_date.as_deref())?;
    Ok(Json(state.reportes.reporte(&patente, desde, hasta, hoy()).await?))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.reportes.dashboard(hoy()).await?))
}

pub async fn alertas_criticas(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<AlertasQuery>,
) -> ApiResult<Json<Vec<Alerta>>> {
    let dias = q.dias.unwrap_or(DIAS_ALERTA_DASHBOARD);
    Ok(Json(state.reportes.alertas(dias, hoy()).await?))
}
