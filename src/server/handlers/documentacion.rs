use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use flota_core::{Documento, DocumentoCreado, DocumentoCreate, Mensaje, VencimientoUpdate};

use crate::error::ApiResult;
use crate::server::extract::ApiJson;
use crate::server::state::AppState;

pub async fn listar(
    State(state): State<AppState>,
    Path(patente): Path<String>,
) -> ApiResult<Json<Vec<Documento>>> {
    Ok(Json(state.documentacion.listar(&patente).await?))
}

pub async fn crear(
    State(state): State<AppState>,
    Path(patente): Path<String>,
    ApiJson(input): ApiJson<DocumentoCreate>,
) -> ApiResult<(StatusCode, Json<DocumentoCreado>)> {
    let creado = state.documentacion.crear(&patente, input).await?;
    Ok((StatusCode::CREATED, Json(creado)))
}

pub async fn actualizar_vencimiento(
    State(state): State<AppState>,
    Path((patente, tipo_documento)): Path<(String, String)>,
    ApiJson(data): ApiJson<VencimientoUpdate>,
) -> ApiResult<Json<Mensaje>> {
    let mensaje = state
        .documentacion
        .actualizar_vencimiento(&patente, &tipo_documento, data)
        .await?;
    Ok(Json(mensaje))
}
