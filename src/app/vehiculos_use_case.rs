use flota_core::constants::VEHICULOS;
use flota_core::reconcile::patente::normalize_patente;
use flota_core::reconcile::vehiculo::{new_vehiculo_document, update_fields, vehiculo_from_document};
use flota_core::storage::{Document, Filter, Storage};
use flota_core::{DocumentoDigital, FlotaError, Result, Vehiculo, VehiculoInput, VehiculoUpdate};
use regex::RegexBuilder;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::observability::metrics;

pub const LIMIT_DEFAULT: i64 = 100;
pub const LIMIT_MAX: i64 = 1000;

/// Vehicle listing and CRUD over the `Vehiculos` collection
#[derive(Clone)]
pub struct VehiculosUseCase {
    storage: Arc<dyn Storage>,
}

impl VehiculosUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Locate the stored document for a plate: by id first, then by any
    /// legacy `patente`/`PATENTE` field that normalizes to the same plate.
    pub async fn find_document(&self, patente: &str) -> Result<Option<(String, Document)>> {
        let patente = normalize_patente(patente);
        if patente.is_empty() {
            return Ok(None);
        }
        if let Some(doc) = self.storage.get(VEHICULOS, &patente).await? {
            return Ok(Some((patente, doc)));
        }
        let legacy = self
            .storage
            .find(VEHICULOS, &Filter::all().patente(&patente))
            .await?;
        Ok(legacy.into_iter().next().and_then(|doc| {
            flota_core::reconcile::document_id(&doc).map(|id| (id, doc))
        }))
    }

    async fn require(&self, patente: &str) -> Result<(String, Document)> {
        self.find_document(patente).await?.ok_or_else(|| {
            FlotaError::not_found(format!("Vehículo con patente {patente} no encontrado."))
        })
    }

    pub async fn list(&self, skip: i64, limit: i64, filtro: Option<&str>) -> Result<Vec<Vehiculo>> {
        if skip < 0 {
            return Err(FlotaError::validation("skip debe ser mayor o igual a 0"));
        }
        if !(1..=LIMIT_MAX).contains(&limit) {
            return Err(FlotaError::validation(format!(
                "limit debe estar entre 1 y {LIMIT_MAX}"
            )));
        }

        let pattern = filtro
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| {
                RegexBuilder::new(&regex::escape(f))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| FlotaError::validation(format!("Filtro inválido: {e}")))
            })
            .transpose()?;

        let mut vehiculos: Vec<Vehiculo> = self
            .storage
            .find(VEHICULOS, &Filter::all())
            .await?
            .iter()
            .map(vehiculo_from_document)
            .filter(|v| match &pattern {
                None => true,
                Some(re) => [
                    Some(&v.patente),
                    v.patente_original.as_ref(),
                    v.nro_movil.as_ref(),
                    v.descripcion_modelo.as_ref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| re.is_match(field)),
            })
            .collect();
        vehiculos.sort_by(|a, b| a.patente.cmp(&b.patente));

        Ok(vehiculos
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    pub async fn get(&self, patente: &str) -> Result<Vehiculo> {
        let (_, doc) = self.require(patente).await?;
        Ok(vehiculo_from_document(&doc))
    }

    pub async fn create(&self, input: VehiculoInput) -> Result<Vehiculo> {
        let doc = new_vehiculo_document(&input)?;
        let patente = normalize_patente(&input.patente);
        if self.find_document(&patente).await?.is_some() {
            return Err(FlotaError::conflict(format!(
                "Ya existe un vehículo con la patente {}.",
                input.patente.trim().to_uppercase()
            )));
        }

        self.storage.insert(VEHICULOS, doc.clone()).await?;
        metrics::vehiculos::created();
        info!("Vehículo creado: {}", patente);
        Ok(vehiculo_from_document(&doc))
    }

    /// Partial update; an empty update returns the vehicle unchanged
    pub async fn update(&self, patente: &str, update: VehiculoUpdate) -> Result<Vehiculo> {
        let (id, doc) = self.require(patente).await?;
        let fields = update_fields(&update);
        if fields.is_empty() {
            return Ok(vehiculo_from_document(&doc));
        }

        if !self.storage.update(VEHICULOS, &id, fields).await? {
            return Err(FlotaError::not_found(format!(
                "Vehículo con patente {patente} no encontrado."
            )));
        }
        info!("Vehículo actualizado: {}", id);
        self.get(&id).await
    }

    pub async fn delete(&self, patente: &str) -> Result<()> {
        let (id, _) = self.require(patente).await?;
        self.storage.delete(VEHICULOS, &id).await?;
        metrics::vehiculos::deleted();
        info!("Vehículo eliminado: {}", id);
        Ok(())
    }

    /// Append (or replace, by file name) an entry in the vehicle's digital
    /// documents. Returns false when the vehicle does not exist.
    pub async fn registrar_documento(&self, patente: &str, documento: DocumentoDigital) -> Result<bool> {
        let Some((id, doc)) = self.find_document(patente).await? else {
            return Ok(false);
        };

        let mut documentos: Vec<Value> = doc
            .get("documentos_digitales")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        documentos.retain(|d| {
            d.get("nombre_archivo").and_then(Value::as_str) != documento.nombre_archivo.as_deref()
        });
        documentos.push(serde_json::to_value(&documento)?);

        let mut fields = Document::new();
        fields.insert("documentos_digitales".into(), Value::Array(documentos));
        self.storage.update(VEHICULOS, &id, fields).await
    }
}
