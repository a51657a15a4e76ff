use chrono::Utc;
use flota_core::reconcile::costos::{documento_costo_manual, monto_field, monto_raw_es_cero, unificar};
use flota_core::reconcile::{coalesce_str, patente::normalize_patente};
use flota_core::storage::{BlobStore, BlobUpload, Document, Filter, Storage};
use flota_core::{
    CreateCostoResponse, FlotaError, GastosUnificados, LimpiezaResultado, MontoActualizado,
    NuevoCosto, Origen, Result, UpdateMonto,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::validar_archivo;
use crate::observability::metrics;

/// Manual costs, the unified expense view and expense maintenance
#[derive(Clone)]
pub struct CostosUseCase {
    storage: Arc<dyn Storage>,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
}

impl CostosUseCase {
    pub fn new(storage: Arc<dyn Storage>, blobs: Arc<dyn BlobStore>, max_upload_bytes: usize) -> Self {
        Self {
            storage,
            blobs,
            max_upload_bytes,
        }
    }

    pub async fn crear_manual(
        &self,
        nuevo: NuevoCosto,
        comprobante: Option<BlobUpload>,
    ) -> Result<CreateCostoResponse> {
        let costo = nuevo.validate()?;

        let file_id = match comprobante {
            Some(mut upload) => {
                validar_archivo(&upload, self.max_upload_bytes)?;
                upload.metadata.insert("patente".into(), json!(costo.patente));
                upload.metadata.insert("tipo".into(), json!("comprobante_costo"));
                let bytes = upload.bytes.len();
                let id = self.blobs.put(upload).await?;
                metrics::archivos::uploaded("comprobante", bytes);
                Some(id)
            }
            None => None,
        };

        let costo_id = Uuid::new_v4().to_string();
        let doc = documento_costo_manual(&costo_id, &costo, file_id.as_deref());
        if let Err(e) = self.storage.insert(costo.origen.collection(), doc).await {
            if let Some(id) = &file_id {
                if let Err(borrado) = self.blobs.delete(id).await {
                    warn!("No se pudo eliminar el comprobante huérfano {}: {}", id, borrado);
                }
            }
            return Err(e);
        }

        metrics::costos::created(costo.origen.collection());
        info!(
            "Costo creado: _id={} origen={} patente={} file_id={:?}",
            costo_id, costo.origen, costo.patente, file_id
        );

        Ok(CreateCostoResponse {
            message: "Costo creado correctamente".to_string(),
            costo_id,
            file_id,
        })
    }

    pub async fn unificado(&self, patente: &str) -> Result<GastosUnificados> {
        let patente = normalize_patente(patente);
        let filter = Filter::all().patente(&patente);
        let mantenimiento = self.storage.find(Origen::Mantenimiento.collection(), &filter).await?;
        let finanzas = self.storage.find(Origen::Finanzas.collection(), &filter).await?;

        let view = unificar(&patente, &mantenimiento, &finanzas);
        info!(
            "Reporte unificado {}: {} items | Total: {}",
            patente,
            view.gastos.len(),
            view.total_general
        );
        Ok(view)
    }

    /// Delete one expense and its receipt, if any
    pub async fn eliminar(&self, origen: Origen, id: &str) -> Result<()> {
        let collection = origen.collection();
        let doc = self
            .storage
            .get(collection, id)
            .await?
            .ok_or_else(|| FlotaError::not_found("Gasto no encontrado"))?;

        self.storage.delete(collection, id).await?;
        if let Some(file_id) = coalesce_str(&doc, &["comprobante_file_id"]) {
            if let Err(e) = self.blobs.delete(&file_id).await {
                warn!("No se pudo borrar el comprobante {}: {}", file_id, e);
            }
        }

        metrics::costos::deleted(collection);
        info!("Gasto eliminado: {} ({})", id, collection);
        Ok(())
    }

    pub async fn actualizar_monto(&self, coleccion: &str, id: &str, data: UpdateMonto) -> Result<MontoActualizado> {
        let origen = Origen::parse_lenient(coleccion).ok_or_else(|| {
            FlotaError::validation("Colección no válida. Usa 'finanzas' o 'mantenimiento'.")
        })?;
        data.validate()?;

        let collection = origen.collection();
        let doc = self
            .storage
            .get(collection, id)
            .await?
            .ok_or_else(|| FlotaError::not_found(format!("Documento no encontrado: {id}")))?;

        let campo = monto_field(origen, &doc);
        let modified = doc.get(campo).and_then(|v| v.as_f64()) != Some(data.monto);

        let mut fields = Document::new();
        fields.insert(campo.to_string(), json!(data.monto));
        if let Some(motivo) = &data.motivo {
            fields.insert("motivo".into(), json!(motivo));
        }
        fields.insert("monto_actualizado_en".into(), json!(Utc::now().to_rfc3339()));
        self.storage.update(collection, id, fields).await?;

        info!("Monto actualizado: {} {} {} = {}", collection, id, campo, data.monto);
        Ok(MontoActualizado {
            message: format!("Monto actualizado correctamente en {collection}"),
            modified,
            campo: campo.to_string(),
        })
    }

    /// Remove (or, with `dry_run`, count) expenses whose stored amount is exactly zero
    pub async fn limpiar_basura(&self, origen: Option<Origen>, dry_run: bool) -> Result<LimpiezaResultado> {
        let origenes: Vec<Origen> = match origen {
            Some(o) => vec![o],
            None => Origen::ALL.to_vec(),
        };

        let mut detalles = BTreeMap::new();
        for origen in origenes {
            let collection = origen.collection();
            let basura: Vec<String> = self
                .storage
                .find(collection, &Filter::all())
                .await?
                .iter()
                .filter(|doc| monto_raw_es_cero(origen, doc))
                .filter_map(flota_core::reconcile::document_id)
                .collect();

            let mut eliminados = 0;
            if dry_run {
                eliminados = basura.len();
            } else {
                for id in &basura {
                    if self.storage.delete(collection, id).await? {
                        eliminados += 1;
                    }
                }
            }
            detalles.insert(collection.to_string(), eliminados);
        }

        let total_eliminados = detalles.values().sum();
        if !dry_run {
            metrics::costos::cleaned(total_eliminados);
        }
        info!("Limpieza de costos (dry_run={}): {:?}", dry_run, detalles);

        Ok(LimpiezaResultado {
            mensaje: if dry_run {
                "Simulación completada (nada borrado)".to_string()
            } else {
                "Limpieza completada".to_string()
            },
            total_eliminados,
            detalles_por_coleccion: detalles,
        })
    }
}
