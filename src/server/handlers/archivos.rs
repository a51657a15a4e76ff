use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use flota_core::{ArchivoSubido, Mensaje};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::server::extract::{ApiQuery, Formulario};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub preview: bool,
}

#[derive(Debug, Deserialize)]
pub struct RutaQuery {
    #[serde(default)]
    pub path_relativo: String,
}

/// ASCII-only base filename for the Content-Disposition header
fn nombre_para_header(nombre: &str) -> String {
    let base = nombre.rsplit(['/', '\\']).next().unwrap_or_default();
    let limpio: String = base
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    match limpio.trim() {
        "" | "." | ".." => "archivo".to_string(),
        _ => limpio,
    }
}

fn archivo_response(nombre: &str, content_type: &str, inline: bool, bytes: Vec<u8>) -> Response {
    let disposicion = if inline { "inline" } else { "attachment" };
    let disposition = HeaderValue::from_str(&format!(
        "{disposicion}; filename=\"{}\"",
        nombre_para_header(nombre)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

pub async fn descargar_blob(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    ApiQuery(q): ApiQuery<PreviewQuery>,
) -> ApiResult<Response> {
    let blob = state.archivos.descargar_blob(&file_id).await?;
    Ok(archivo_response(
        &blob.info.filename,
        &blob.info.content_type,
        q.preview,
        blob.bytes,
    ))
}

pub async fn descargar_archivo(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RutaQuery>,
) -> ApiResult<Response> {
    let archivo = state.archivos.leer_archivo(&q.path_relativo).await?;
    Ok(archivo_response(
        &archivo.nombre,
        archivo.content_type,
        false,
        archivo.bytes,
    ))
}

/// Multipart `patente`, `file` and optional `tipo`
pub async fn subir_documento(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ArchivoSubido>)> {
    let mut form = Formulario::leer(multipart).await?;
    let patente = form.requerido("patente")?;
    let tipo = form.campo("tipo").map(str::to_string);
    let archivo = form
        .archivo("file")
        .ok_or_else(|| ApiError::bad_request("Campo requerido: file"))?;

    let subido = state
        .archivos
        .subir_documento(&patente, tipo.as_deref(), archivo)
        .await?;
    Ok((StatusCode::CREATED, Json(subido)))
}

pub async fn eliminar_archivo(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RutaQuery>,
) -> ApiResult<Json<Mensaje>> {
    Ok(Json(state.archivos.eliminar_archivo(&q.path_relativo).await?))
}
