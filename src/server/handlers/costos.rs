use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use flota_core::{
    CreateCostoResponse, GastosUnificados, LimpiezaResultado, Mensaje, MontoActualizado, Origen,
    UpdateMonto,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};
use crate::server::extract::{ApiJson, ApiQuery, CostoManualForm};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrigenQuery {
    pub origen: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimpiezaQuery {
    pub origen: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

pub async fn crear_manual(
    State(state): State<AppState>,
    form: CostoManualForm,
) -> ApiResult<(StatusCode, Json<CreateCostoResponse>)> {
    let creado = state.costos.crear_manual(form.costo, form.comprobante).await?;
    Ok((StatusCode::CREATED, Json(creado)))
}

pub async fn unificado(
    State(state): State<AppState>,
    Path(patente): Path<String>,
) -> ApiResult<Json<GastosUnificados>> {
    Ok(Json(state.costos.unificado(&patente).await?))
}

/// `origen` accepts `costos`/`finanzas` as well as the collection names
pub async fn eliminar_universal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(q): ApiQuery<OrigenQuery>,
) -> ApiResult<Json<Mensaje>> {
    let origen = q
        .origen
        .as_deref()
        .and_then(Origen::parse_lenient)
        .ok_or_else(|| ApiError::bad_request("Origen inválido: debe ser 'costos' o 'finanzas'"))?;
    state.costos.eliminar(origen, &id).await?;
    Ok(Json(Mensaje::new(format!(
        "Gasto eliminado correctamente de {origen}"
    ))))
}

pub async fn eliminar_manual(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(q): ApiQuery<OrigenQuery>,
) -> ApiResult<StatusCode> {
    let origen = Origen::from_str(q.origen.as_deref().unwrap_or_default())?;
    state.costos.eliminar(origen, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn actualizar_monto(
    State(state): State<AppState>,
    Path((coleccion, id)): Path<(String, String)>,
    ApiJson(data): ApiJson<UpdateMonto>,
) -> ApiResult<Json<MontoActualizado>> {
    Ok(Json(state.costos.actualizar_monto(&coleccion, &id, data).await?))
}

pub async fn limpiar_basura(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<LimpiezaQuery>,
) -> ApiResult<Json<LimpiezaResultado>> {
    let origen = match q.origen.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        None => None,
        Some(o) => Some(Origen::from_str(o).map_err(|_| {
            ApiError::bad_request("Origen inválido. Debe ser 'Finanzas' o 'Mantenimiento'.")
        })?),
    };
    Ok(Json(state.costos.limpiar_basura(origen, q.dry_run).await?))
}
