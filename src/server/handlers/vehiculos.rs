use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use flota_core::{Vehiculo, VehiculoInput, VehiculoUpdate};
use serde::Deserialize;

use crate::app::vehiculos_use_case::LIMIT_DEFAULT;
use crate::error::ApiResult;
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListarQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub filtro: Option<String>,
}

pub async fn listar(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ListarQuery>,
) -> ApiResult<Json<Vec<Vehiculo>>> {
    let vehiculos = state
        .vehiculos
        .list(
            q.skip.unwrap_or(0),
            q.limit.unwrap_or(LIMIT_DEFAULT),
            q.filtro.as_deref(),
        )
        .await?;
    Ok(Json(vehiculos))
}

pub async fn obtener(
    State(state): State<AppState>,
    Path(patente): Path<String>,
) -> ApiResult<Json<Vehiculo>> {
    Ok(Json(state.vehiculos.get(&patente).await?))
}

pub async fn crear(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<VehiculoInput>,
) -> ApiResult<(StatusCode, Json<Vehiculo>)> {
    let vehiculo = state.vehiculos.create(input).await?;
    Ok((StatusCode::CREATED, Json(vehiculo)))
}

pub async fn actualizar(
    State(state): State<AppState>,
    Path(patente): Path<String>,
    ApiJson(update): ApiJson<VehiculoUpdate>,
) -> ApiResult<Json<Vehiculo>> {
    Ok(Json(state.vehiculos.update(&patente, update).await?))
}

pub async fn eliminar(
    State(state): State<AppState>,
    Path(patente): Path<String>,
) -> ApiResult<StatusCode> {
    state.vehiculos.delete(&patente).await?;
    Ok(StatusCode::NO_CONTENT)
}
