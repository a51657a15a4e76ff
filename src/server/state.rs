use flota_core::storage::{BlobStore, Storage};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::{
    ArchivosUseCase, CostosUseCase, DocumentacionUseCase, PolizasUseCase, ReportesUseCase,
    VehiculosUseCase,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub vehiculos: VehiculosUseCase,
    pub costos: CostosUseCase,
    pub reportes: ReportesUseCase,
    pub polizas: PolizasUseCase,
    pub documentacion: DocumentacionUseCase,
    pub archivos: ArchivosUseCase,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn Storage>,
        blobs: Arc<dyn BlobStore>,
        media_root: impl Into<PathBuf>,
        max_upload_bytes: usize,
    ) -> Self {
        let vehiculos = VehiculosUseCase::new(storage.clone());
        Self {
            costos: CostosUseCase::new(storage.clone(), blobs.clone(), max_upload_bytes),
            reportes: ReportesUseCase::new(storage.clone()),
            polizas: PolizasUseCase::new(storage.clone(), blobs.clone(), max_upload_bytes),
            documentacion: DocumentacionUseCase::new(storage),
            archivos: ArchivosUseCase::new(blobs, vehiculos.clone(), media_root, max_upload_bytes),
            vehiculos,
            max_upload_bytes,
        }
    }
}
