//! Files: object-store downloads and the on-disk media tree
//! (`<media_root>/Documentos-Digitales/<PATENTE>/<archivo>`).

use flota_core::constants::DOC_RAIZ;
use flota_core::reconcile::patente::normalize_patente;
use flota_core::storage::{BlobStore, BlobUpload, StoredBlob};
use flota_core::{ArchivoSubido, DocumentoDigital, FlotaError, Mensaje, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

use super::{validar_archivo, VehiculosUseCase};
use crate::observability::metrics;

/// A file read from the media tree
#[derive(Debug, Clone)]
pub struct ArchivoLocal {
    pub nombre: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ArchivosUseCase {
    blobs: Arc<dyn BlobStore>,
    vehiculos: VehiculosUseCase,
    media_root: PathBuf,
    max_upload_bytes: usize,
}

/// Normalize a client-supplied relative path and reject anything that could
/// leave the documents root.
pub fn ruta_segura(path_relativo: &str) -> Result<PathBuf> {
    let mut ruta = path_relativo.replace('\\', "/");
    if let Some(resto) = ruta.strip_prefix(&format!("{DOC_RAIZ}/")) {
        ruta = resto.to_string();
    }
    let ruta = ruta.trim_matches('/');
    if ruta.is_empty() {
        return Err(FlotaError::validation("Ruta no válida."));
    }

    let path = Path::new(ruta);
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(FlotaError::validation("Ruta no válida."));
    }
    Ok(path.to_path_buf())
}

/// Content type from the file extension, for downloads
pub fn content_type_por_extension(nombre: &str) -> &'static str {
    let extension = Path::new(nombre)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

impl ArchivosUseCase {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        vehiculos: VehiculosUseCase,
        media_root: impl Into<PathBuf>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            blobs,
            vehiculos,
            media_root: media_root.into(),
            max_upload_bytes,
        }
    }

    fn doc_raiz(&self) -> PathBuf {
        self.media_root.join(DOC_RAIZ)
    }

    pub async fn descargar_blob(&self, file_id: &str) -> Result<StoredBlob> {
        let blob = self
            .blobs
            .get(file_id)
            .await?
            .ok_or_else(|| FlotaError::not_found("Archivo no encontrado"))?;
        metrics::archivos::downloaded("blob");
        Ok(blob)
    }

    pub async fn leer_archivo(&self, path_relativo: &str) -> Result<ArchivoLocal> {
        let path = self.doc_raiz().join(ruta_segura(path_relativo)?);
        if !fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false) {
            warn!("Archivo no encontrado: {}", path.display());
            return Err(FlotaError::not_found("Archivo no encontrado."));
        }

        let nombre = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = fs::read(&path).await?;
        metrics::archivos::downloaded("media");
        info!("Descargando {}", path.display());
        Ok(ArchivoLocal {
            content_type: content_type_por_extension(&nombre),
            nombre,
            bytes,
        })
    }

    /// Save a vehicle document under its plate folder and list it on the
    /// vehicle when the vehicle exists.
    pub async fn subir_documento(
        &self,
        patente: &str,
        tipo: Option<&str>,
        upload: BlobUpload,
    ) -> Result<ArchivoSubido> {
        let patente = normalize_patente(patente);
        if patente.is_empty() {
            return Err(FlotaError::validation("La patente es obligatoria"));
        }
        validar_archivo(&upload, self.max_upload_bytes)?;

        let filename = Path::new(&upload.filename.replace('\\', "/"))
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| FlotaError::validation("Nombre de archivo inválido"))?;

        let target_dir = self.doc_raiz().join(&patente);
        fs::create_dir_all(&target_dir).await?;
        fs::write(target_dir.join(&filename), &upload.bytes).await?;
        metrics::archivos::uploaded("documento", upload.bytes.len());

        let path_relativo = format!("{patente}/{filename}");
        let registrado = self
            .vehiculos
            .registrar_documento(
                &patente,
                DocumentoDigital {
                    tipo: tipo
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .unwrap_or("OTRO")
                        .to_string(),
                    nombre_archivo: Some(filename.clone()),
                    path_esperado: Some(format!("{DOC_RAIZ}/{path_relativo}")),
                    existe_fisicamente: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        info!("Archivo subido: {} (vehículo registrado: {})", path_relativo, registrado);
        Ok(ArchivoSubido {
            message: "Archivo subido con éxito".to_string(),
            patente,
            filename,
            path_relativo,
            registrado_en_vehiculo: registrado,
        })
    }

    /// Delete a media file; the plate folder goes too once it is empty
    pub async fn eliminar_archivo(&self, path_relativo: &str) -> Result<Mensaje> {
        let raiz = self.doc_raiz();
        let path = raiz.join(ruta_segura(path_relativo)?);
        if !fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false) {
            return Err(FlotaError::not_found("Archivo no encontrado."));
        }

        fs::remove_file(&path).await?;
        if let Some(parent) = path.parent().filter(|p| *p != raiz.as_path()) {
            // Fails while the folder still has files, which is fine
            let _ = fs::remove_dir(parent).await;
        }

        let nombre = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Archivo eliminado: {}", nombre);
        Ok(Mensaje::new(format!("Archivo '{nombre}' eliminado con éxito")))
    }
}
