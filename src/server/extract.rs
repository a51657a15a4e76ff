//! Request extractors that answer with the API's `{"detail"}` errors.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use flota_core::storage::{BlobUpload, Document};
use flota_core::NuevoCosto;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};

/// `Json<T>` with `ApiError` rejections
#[derive(axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query<T>` with `ApiError` rejections
#[derive(axum::extract::FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// A fully read multipart form: text fields and file parts by name
#[derive(Debug, Default)]
pub struct Formulario {
    campos: HashMap<String, String>,
    archivos: HashMap<String, BlobUpload>,
}

impl Formulario {
    pub async fn leer(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                // Browsers send an empty part when no file was chosen
                Some(filename) if filename.is_empty() => {
                    field.bytes().await?;
                }
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?.to_vec();
                    form.archivos.insert(
                        name,
                        BlobUpload {
                            filename,
                            content_type,
                            bytes,
                            metadata: Document::new(),
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    form.campos.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn campo(&self, name: &str) -> Option<&str> {
        self.campos.get(name).map(String::as_str)
    }

    pub fn requerido(&self, name: &str) -> ApiResult<String> {
        self.campo(name)
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request(format!("Campo requerido: {name}")))
    }

    pub fn archivo(&mut self, name: &str) -> Option<BlobUpload> {
        self.archivos.remove(name)
    }
}

/// Body of `POST /costos/manual`: a multipart form (with optional
/// `comprobante` file) or a plain JSON object.
pub struct CostoManualForm {
    pub costo: NuevoCosto,
    pub comprobante: Option<BlobUpload>,
}

#[async_trait]
impl<S> FromRequest<S> for CostoManualForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let es_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !es_multipart {
            let Json(costo) = Json::<NuevoCosto>::from_request(req, state).await?;
            return Ok(Self {
                costo,
                comprobante: None,
            });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let mut form = Formulario::leer(multipart).await?;

        let importe_raw = form.requerido("importe")?;
        let importe = flota_core::reconcile::value_as_f64(&serde_json::json!(importe_raw))
            .ok_or_else(|| ApiError::bad_request("Importe inválido"))?;

        Ok(Self {
            costo: NuevoCosto {
                patente: form.requerido("patente")?,
                tipo_costo: form.requerido("tipo_costo")?,
                fecha: form.requerido("fecha")?,
                descripcion: form.campo("descripcion").unwrap_or_default().to_string(),
                importe,
                origen: form.requerido("origen")?,
            },
            comprobante: form.archivo("comprobante"),
        })
    }
}
