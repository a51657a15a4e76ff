use chrono::Utc;
use flota_core::constants::POLIZAS;
use flota_core::reconcile::documentos::{poliza_document, poliza_from_document};
use flota_core::storage::{BlobStore, BlobUpload, Filter, Storage};
use flota_core::{FlotaError, Mensaje, Poliza, Result};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::validar_archivo;
use crate::observability::metrics;

pub const MAX_LISTADO: usize = 100;

/// Insurance policies and their scanned documents
#[derive(Clone)]
pub struct PolizasUseCase {
    storage: Arc<dyn Storage>,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
}

fn requerido(value: &str, campo: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FlotaError::validation(format!("El campo {campo} es obligatorio")));
    }
    Ok(value.to_string())
}

impl PolizasUseCase {
    pub fn new(storage: Arc<dyn Storage>, blobs: Arc<dyn BlobStore>, max_upload_bytes: usize) -> Self {
        Self {
            storage,
            blobs,
            max_upload_bytes,
        }
    }

    /// Newest first, at most [`MAX_LISTADO`]
    pub async fn listar(&self) -> Result<Vec<Poliza>> {
        let mut polizas: Vec<Poliza> = self
            .storage
            .find(POLIZAS, &Filter::all())
            .await?
            .iter()
            .filter_map(poliza_from_document)
            .collect();
        polizas.sort_by(|a, b| b.fecha_subida.cmp(&a.fecha_subida));
        polizas.truncate(MAX_LISTADO);
        Ok(polizas)
    }

    async fn get(&self, id: &str) -> Result<Poliza> {
        self.storage
            .get(POLIZAS, id)
            .await?
            .as_ref()
            .and_then(poliza_from_document)
            .ok_or_else(|| FlotaError::not_found("Póliza no encontrada"))
    }

    async fn numero_en_uso(&self, numero_poliza: &str, excepto: Option<&str>) -> Result<bool> {
        let existentes = self
            .storage
            .find(POLIZAS, &Filter::all().eq("numero_poliza", numero_poliza))
            .await?;
        Ok(existentes.iter().any(|doc| {
            flota_core::reconcile::document_id(doc).as_deref() != excepto
        }))
    }

    async fn subir(&self, mut upload: BlobUpload, empresa: &str, numero_poliza: &str) -> Result<String> {
        validar_archivo(&upload, self.max_upload_bytes)?;
        upload.metadata.insert("empresa".into(), json!(empresa));
        upload.metadata.insert("numero_poliza".into(), json!(numero_poliza));
        let bytes = upload.bytes.len();
        let file_id = self.blobs.put(upload).await?;
        metrics::archivos::uploaded("poliza", bytes);
        Ok(file_id)
    }

    pub async fn crear(&self, empresa: &str, numero_poliza: &str, archivo: BlobUpload) -> Result<Poliza> {
        let empresa = requerido(empresa, "empresa")?;
        let numero_poliza = requerido(numero_poliza, "numero_poliza")?;
        if self.numero_en_uso(&numero_poliza, None).await? {
            return Err(FlotaError::conflict(format!("Póliza {numero_poliza} ya existe")));
        }

        let filename = archivo.filename.clone();
        let file_id = self.subir(archivo, &empresa, &numero_poliza).await?;
        let poliza = Poliza {
            id: Uuid::new_v4().to_string(),
            empresa,
            numero_poliza,
            filename,
            file_id,
            fecha_subida: Utc::now(),
        };
        self.storage.insert(POLIZAS, poliza_document(&poliza)).await?;
        info!("Póliza {} creada ({})", poliza.numero_poliza, poliza.empresa);
        Ok(poliza)
    }

    /// Replace the data of a policy; a new file supersedes the stored one
    pub async fn actualizar(
        &self,
        id: &str,
        empresa: &str,
        numero_poliza: &str,
        archivo: Option<BlobUpload>,
    ) -> Result<Poliza> {
        let actual = self.get(id).await?;
        let empresa = requerido(empresa, "empresa")?;
        let numero_poliza = requerido(numero_poliza, "numero_poliza")?;
        if numero_poliza != actual.numero_poliza && self.numero_en_uso(&numero_poliza, Some(id)).await? {
            return Err(FlotaError::conflict(format!("Póliza {numero_poliza} ya existe")));
        }

        let mut poliza = Poliza {
            empresa,
            numero_poliza,
            ..actual.clone()
        };
        if let Some(archivo) = archivo {
            poliza.filename = archivo.filename.clone();
            poliza.file_id = self.subir(archivo, &poliza.empresa, &poliza.numero_poliza).await?;
        }

        self.storage.update(POLIZAS, id, poliza_document(&poliza)).await?;
        if poliza.file_id != actual.file_id {
            if let Err(e) = self.blobs.delete(&actual.file_id).await {
                warn!("No se pudo borrar el archivo anterior {}: {}", actual.file_id, e);
            }
        }
        info!("Póliza {} actualizada", id);
        Ok(poliza)
    }

    pub async fn eliminar(&self, id: &str) -> Result<Mensaje> {
        let poliza = self.get(id).await?;
        self.blobs.delete(&poliza.file_id).await?;
        self.storage.delete(POLIZAS, id).await?;
        info!("Póliza {} eliminada", id);
        Ok(Mensaje::new("Póliza eliminada correctamente"))
    }
}
