use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use flota_core::{Mensaje, Poliza};

use crate::error::{ApiError, ApiResult};
use crate::server::extract::Formulario;
use crate::server::state::AppState;

pub async fn listar(State(state): State<AppState>) -> ApiResult<Json<Vec<Poliza>>> {
    Ok(Json(state.polizas.listar().await?))
}

/// Multipart `empresa`, `numero_poliza` and `file`
pub async fn crear(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Poliza>)> {
    let mut form = Formulario::leer(multipart).await?;
    let empresa = form.requerido("empresa")?;
    let numero = form.requerido("numero_poliza")?;
    let archivo = form
        .archivo("file")
        .ok_or_else(|| ApiError::bad_request("Campo requerido: file"))?;

    let poliza = state.polizas.crear(&empresa, &numero, archivo).await?;
    Ok((StatusCode::CREATED, Json(poliza)))
}

pub async fn actualizar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Poliza>> {
    let mut form = Formulario::leer(multipart).await?;
    let empresa = form.requerido("empresa")?;
    let numero = form.requerido("numero_poliza")?;
    let archivo = form.archivo("file");

    Ok(Json(state.polizas.actualizar(&id, &empresa, &numero, archivo).await?))
}

pub async fn eliminar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Mensaje>> {
    Ok(Json(state.polizas.eliminar(&id).await?))
}
