//! Use cases behind the HTTP API. Each one owns the storage handles it needs
//! and speaks in reconciled domain types.

pub mod archivos_use_case;
pub mod costos_use_case;
pub mod documentacion_use_case;
pub mod polizas_use_case;
pub mod reportes_use_case;
pub mod vehiculos_use_case;

pub use archivos_use_case::{ArchivosUseCase, ArchivoLocal};
pub use costos_use_case::CostosUseCase;
pub use documentacion_use_case::DocumentacionUseCase;
pub use polizas_use_case::PolizasUseCase;
pub use reportes_use_case::ReportesUseCase;
pub use vehiculos_use_case::VehiculosUseCase;

use flota_core::constants::is_allowed_content_type;
use flota_core::storage::BlobUpload;
use flota_core::{FlotaError, Result};

/// Content type and size checks shared by every upload
pub fn validar_archivo(upload: &BlobUpload, max_bytes: usize) -> Result<()> {
    if !is_allowed_content_type(&upload.content_type) {
        return Err(FlotaError::validation(
            "Tipo de archivo no permitido (solo PDF, JPG, PNG)",
        ));
    }
    if upload.bytes.len() > max_bytes {
        return Err(FlotaError::PayloadTooLarge(format!(
            "Archivo demasiado grande (máx {}MB)",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}
