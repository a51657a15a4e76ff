use flota_core::constants::DOCUMENTACION;
use flota_core::reconcile::documentos::{documento_from_document, nuevo_documento};
use flota_core::reconcile::{document_id, fechas::parse_fecha_str, patente::normalize_patente};
use flota_core::storage::{Document, Filter, Storage};
use flota_core::{Documento, DocumentoCreado, DocumentoCreate, FlotaError, Mensaje, Result, VencimientoUpdate};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Expiry records (`Documentacion`) per vehicle
#[derive(Clone)]
pub struct DocumentacionUseCase {
    storage: Arc<dyn Storage>,
}

impl DocumentacionUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn listar(&self, patente: &str) -> Result<Vec<Documento>> {
        let documentos: Vec<Documento> = self
            .storage
            .find(DOCUMENTACION, &Filter::all().patente(patente))
            .await?
            .iter()
            .filter_map(documento_from_document)
            .collect();
        if documentos.is_empty() {
            return Err(FlotaError::not_found(
                "No se encontraron documentos para esta patente",
            ));
        }
        Ok(documentos)
    }

    pub async fn crear(&self, patente: &str, input: DocumentoCreate) -> Result<DocumentoCreado> {
        let patente = normalize_patente(patente);
        if patente.is_empty() {
            return Err(FlotaError::validation("La patente es obligatoria"));
        }
        if input.tipo_documento.trim().is_empty() {
            return Err(FlotaError::validation("El tipo de documento es obligatorio"));
        }

        let id = Uuid::new_v4().to_string();
        self.storage
            .insert(DOCUMENTACION, nuevo_documento(&id, &patente, &input))
            .await?;
        info!("Documento {} creado para {}", input.tipo_documento.trim(), patente);
        Ok(DocumentoCreado {
            id,
            message: "Documento creado correctamente".to_string(),
        })
    }

    pub async fn actualizar_vencimiento(
        &self,
        patente: &str,
        tipo_documento: &str,
        data: VencimientoUpdate,
    ) -> Result<Mensaje> {
        let fecha = parse_fecha_str(&data.fecha_vencimiento)
            .ok_or_else(|| FlotaError::validation("Fecha de vencimiento inválida"))?;

        let filter = Filter::all()
            .patente(patente)
            .eq_any(&["tipo_documento", "TIPO_DOCUMENTO"], tipo_documento);
        let targets: Vec<String> = self
            .storage
            .find(DOCUMENTACION, &filter)
            .await?
            .iter()
            .filter_map(document_id)
            .collect();
        if targets.is_empty() {
            return Err(FlotaError::not_found(format!(
                "No se encontró documento {tipo_documento} para la patente {patente}"
            )));
        }

        for id in &targets {
            let mut fields = Document::new();
            fields.insert(
                "fecha_vencimiento".into(),
                json!(fecha.format("%Y-%m-%d").to_string()),
            );
            self.storage.update(DOCUMENTACION, id, fields).await?;
        }
        info!("Fecha de vencimiento actualizada: {} - {} → {}", patente, tipo_documento, fecha);
        Ok(Mensaje::new("Fecha de vencimiento actualizada correctamente"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flota_core::storage::InMemoryStorage;

    fn create(tipo: &str, fecha: Option<&str>) -> DocumentoCreate {
        DocumentoCreate {
            tipo_documento: tipo.into(),
            fecha_vencimiento: fecha.map(str::to_string),
            aseguradora: None,
            numero_poliza: None,
        }
    }

    #[tokio::test]
    async fn test_create_list_update() {
        let uc = DocumentacionUseCase::new(Arc::new(InMemoryStorage::new()));
        assert!(matches!(uc.listar("AA111AA").await, Err(FlotaError::NotFound(_))));

        uc.crear("aa 111 aa", create("VTV", Some("2025-10-01"))).await.unwrap();
        uc.crear("AA111AA", create("GAS", None)).await.unwrap();
        assert_eq!(uc.listar("AA-111-AA").await.unwrap().len(), 2);

        uc.actualizar_vencimiento(
            "AA111AA",
            "VTV",
            VencimientoUpdate { fecha_vencimiento: "15/11/2025".into() },
        )
        .await
        .unwrap();
        let vtv = uc
            .listar("AA111AA")
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.tipo_documento == "VTV")
            .unwrap();
        assert_eq!(vtv.fecha_vencimiento, NaiveDate::from_ymd_opt(2025, 11, 15));
    }

    #[tokio::test]
    async fn test_update_errors() {
        let uc = DocumentacionUseCase::new(Arc::new(InMemoryStorage::new()));
        let bad = VencimientoUpdate { fecha_vencimiento: "pronto".into() };
        assert!(matches!(
            uc.actualizar_vencimiento("AA111AA", "VTV", bad).await,
            Err(FlotaError::Validation(_))
        ));
        let ok = VencimientoUpdate { fecha_vencimiento: "2025-01-01".into() };
        assert!(matches!(
            uc.actualizar_vencimiento("AA111AA", "VTV", ok).await,
            Err(FlotaError::NotFound(_))
        ));
        assert!(uc.crear("AA111AA", create(" ", None)).await.is_err());
    }
}
