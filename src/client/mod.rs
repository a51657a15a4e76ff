//! Typed client for the fleet API, used by the CLI.
//!
//! Vehicle payloads go through the same reconciliation the server applies, so
//! the client also copes with backends that still return legacy-cased fields.

pub mod error;

use chrono::NaiveDate;
use flota_core::reconcile::vehiculo::vehiculo_from_document;
use flota_core::storage::{BlobUpload, Document};
use flota_core::{
    Alerta, ArchivoSubido, CreateCostoResponse, Dashboard, Documento, GastosUnificados, Mensaje,
    MontoActualizado, NuevoCosto, Origen, Poliza, ReporteCostos, UpdateMonto, Vehiculo,
    VehiculoInput, VehiculoUpdate,
};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub use error::{describe_error, ClientError, Result};

/// A downloaded file
#[derive(Debug, Clone)]
pub struct Descarga {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FlotaClient {
    base_url: String,
    http: reqwest::Client,
}

fn file_part(upload: BlobUpload) -> Result<Part> {
    Ok(Part::bytes(upload.bytes)
        .file_name(upload.filename)
        .mime_str(&upload.content_type)?)
}

/// `filename="..."` out of a Content-Disposition header
fn disposition_filename(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
    })
}

impl FlotaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Each segment is percent-encoded onto the base URL path
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let invalida = || ClientError::Validation(format!("URL de API inválida: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalida())?;
        url.path_segments_mut()
            .map_err(|_| invalida())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: describe_error(status.as_u16(), &body),
        })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = self.send(builder).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn health(&self) -> Result<Value> {
        self.json(self.request(Method::GET, &["health"])?).await
    }

    // Vehicles

    pub async fn listar_vehiculos(
        &self,
        skip: u32,
        limit: u32,
        filtro: Option<&str>,
    ) -> Result<Vec<Vehiculo>> {
        let mut query = vec![("skip", skip.to_string()), ("limit", limit.to_string())];
        if let Some(f) = filtro.filter(|f| !f.trim().is_empty()) {
            query.push(("filtro", f.to_string()));
        }
        let raw: Vec<Document> = self
            .json(self.request(Method::GET, &["vehiculos"])?.query(&query))
            .await?;
        Ok(raw.iter().map(vehiculo_from_document).collect())
    }

    pub async fn obtener_vehiculo(&self, patente: &str) -> Result<Vehiculo> {
        let raw: Document = self
            .json(self.request(Method::GET, &["vehiculos", patente])?)
            .await?;
        Ok(vehiculo_from_document(&raw))
    }

    pub async fn crear_vehiculo(&self, input: &VehiculoInput) -> Result<Vehiculo> {
        if input.patente.trim().is_empty() {
            return Err(ClientError::Validation("La patente es obligatoria".into()));
        }
        let raw: Document = self
            .json(self.request(Method::POST, &["vehiculos"])?.json(input))
            .await?;
        Ok(vehiculo_from_document(&raw))
    }

    pub async fn actualizar_vehiculo(&self, patente: &str, update: &VehiculoUpdate) -> Result<Vehiculo> {
        let raw: Document = self
            .json(
                self.request(Method::PATCH, &["vehiculos", patente])?
                    .json(update),
            )
            .await?;
        Ok(vehiculo_from_document(&raw))
    }

    pub async fn eliminar_vehiculo(&self, patente: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &["vehiculos", patente])?)
            .await?;
        Ok(())
    }

    // Reports

    pub async fn reporte(
        &self,
        patente: &str,
        desde: Option<NaiveDate>,
        hasta: Option<NaiveDate>,
    ) -> Result<ReporteCostos> {
        let mut query = Vec::new();
        if let Some(d) = desde {
            query.push(("start_date", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(h) = hasta {
            query.push(("end_date", h.format("%Y-%m-%d").to_string()));
        }
        self.json(
            self.request(Method::GET, &["vehiculos", patente, "reporte"])?
                .query(&query),
        )
        .await
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.json(self.request(Method::GET, &["dashboard"])?).await
    }

    pub async fn alertas(&self, dias: Option<i64>) -> Result<Vec<Alerta>> {
        let mut builder = self.request(Method::GET, &["alertas", "criticas"])?;
        if let Some(dias) = dias {
            builder = builder.query(&[("dias", dias)]);
        }
        self.json(builder).await
    }

    // Expenses

    pub async fn gastos_unificados(&self, patente: &str) -> Result<GastosUnificados> {
        self.json(self.request(Method::GET, &["costos", "unificado", patente])?)
            .await
    }

    /// Validates locally, then submits as multipart (with the receipt when given)
    pub async fn crear_costo(
        &self,
        costo: &NuevoCosto,
        comprobante: Option<BlobUpload>,
    ) -> Result<CreateCostoResponse> {
        let validado = costo
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let mut form = Form::new()
            .text("patente", validado.patente)
            .text("tipo_costo", validado.tipo_costo)
            .text("fecha", validado.fecha.format("%Y-%m-%d").to_string())
            .text("descripcion", validado.descripcion)
            .text("importe", validado.importe.to_string())
            .text("origen", validado.origen.to_string());
        if let Some(upload) = comprobante {
            form = form.part("comprobante", file_part(upload)?);
        }

        self.json(self.request(Method::POST, &["costos", "manual"])?.multipart(form))
            .await
    }

    pub async fn eliminar_costo(&self, origen: Origen, id: &str) -> Result<Mensaje> {
        let origen = match origen {
            Origen::Mantenimiento => "costos",
            Origen::Finanzas => "finanzas",
        };
        self.json(
            self.request(Method::DELETE, &["costos", "universal", id])?
                .query(&[("origen", origen)]),
        )
        .await
    }

    pub async fn actualizar_monto(
        &self,
        origen: Origen,
        id: &str,
        data: &UpdateMonto,
    ) -> Result<MontoActualizado> {
        data.validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        let coleccion = origen.collection().to_lowercase();
        self.json(
            self.request(Method::PATCH, &["monto", coleccion.as_str(), id])?
                .json(data),
        )
        .await
    }

    // Policies and documents

    pub async fn listar_polizas(&self) -> Result<Vec<Poliza>> {
        self.json(self.request(Method::GET, &["polizas"])?).await
    }

    pub async fn crear_poliza(&self, empresa: &str, numero_poliza: &str, archivo: BlobUpload) -> Result<Poliza> {
        let form = Form::new()
            .text("empresa", empresa.to_string())
            .text("numero_poliza", numero_poliza.to_string())
            .part("file", file_part(archivo)?);
        self.json(self.request(Method::POST, &["polizas"])?.multipart(form))
            .await
    }

    pub async fn eliminar_poliza(&self, id: &str) -> Result<Mensaje> {
        self.json(self.request(Method::DELETE, &["polizas", id])?)
            .await
    }

    pub async fn documentacion(&self, patente: &str) -> Result<Vec<Documento>> {
        self.json(self.request(Method::GET, &["documentacion", patente])?)
            .await
    }

    pub async fn subir_documento(
        &self,
        patente: &str,
        tipo: Option<&str>,
        archivo: BlobUpload,
    ) -> Result<ArchivoSubido> {
        let mut form = Form::new()
            .text("patente", patente.to_string())
            .part("file", file_part(archivo)?);
        if let Some(tipo) = tipo {
            form = form.text("tipo", tipo.to_string());
        }
        self.json(
            self.request(Method::POST, &["api", "archivos", "subir-documento"])?
                .multipart(form),
        )
        .await
    }

    /// Object-store download; `preview` asks for an inline disposition
    pub async fn descargar(&self, file_id: &str, preview: bool) -> Result<Descarga> {
        let resp = self
            .send(
                self.request(Method::GET, &["api", "archivos", "descargar", file_id])?
                    .query(&[("preview", preview)]),
            )
            .await?;
        let header_str = |name: header::HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let filename = header_str(header::CONTENT_DISPOSITION)
            .as_deref()
            .and_then(disposition_filename);
        let content_type = header_str(header::CONTENT_TYPE);
        let bytes = resp.bytes().await?.to_vec();
        Ok(Descarga {
            filename,
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_filename() {
        assert_eq!(
            disposition_filename("attachment; filename=\"poliza.pdf\"").as_deref(),
            Some("poliza.pdf")
        );
        assert_eq!(disposition_filename("inline").as_deref(), None);
    }

    #[test]
    fn test_base_url_trimmed() {
        assert_eq!(FlotaClient::new("http://localhost:8000/").base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let client = FlotaClient::new("http://localhost:8000/");
        let url = client.url(&["vehiculos", "AB 123/CD", "reporte"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/vehiculos/AB%20123%2FCD/reporte");

        let prefijo = FlotaClient::new("http://localhost:8000/api");
        let url = prefijo.url(&["polizas", "a?b#c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/polizas/a%3Fb%23c");

        assert!(matches!(
            FlotaClient::new("no es una url").url(&["health"]),
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_cost_is_not_sent() {
        // Nothing listens on this port; validation must fail first
        let client = FlotaClient::new("http://127.0.0.1:9");
        let costo = NuevoCosto {
            patente: "AB123CD".into(),
            tipo_costo: "Service".into(),
            fecha: "2024-05-01".into(),
            descripcion: String::new(),
            importe: 0.0,
            origen: "Mantenimiento".into(),
        };
        let err = client.crear_costo(&costo, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let otro_origen = NuevoCosto {
            importe: 10.0,
            origen: "Taller".into(),
            ..costo
        };
        let err = client.crear_costo(&otro_origen, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
