use chrono::{Duration, NaiveDate};
use flota_core::constants::{DOCUMENTACION, VEHICULOS};
use flota_core::reconcile::alertas::calcular_alertas;
use flota_core::reconcile::costos::reporte_periodo;
use flota_core::reconcile::patente::normalize_patente;
use flota_core::reconcile::vehiculo::vehiculo_from_document;
use flota_core::storage::{Filter, Storage};
use flota_core::{Alerta, Dashboard, FlotaError, Origen, ReporteCostos, Result, ResumenCostos};
use std::sync::Arc;
use tracing::{debug, info};

use super::VehiculosUseCase;

/// Default `dias` for the alerts listing
pub const DIAS_ALERTA_DASHBOARD: i64 = 30;
/// Default report window
pub const DIAS_PERIODO: i64 = 365;

/// Period reports, fleet alerts and the dashboard summary
#[derive(Clone)]
pub struct ReportesUseCase {
    storage: Arc<dyn Storage>,
    vehiculos: VehiculosUseCase,
}

impl ReportesUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            vehiculos: VehiculosUseCase::new(storage.clone()),
            storage,
        }
    }

    pub async fn reporte(
        &self,
        patente: &str,
        desde: Option<NaiveDate>,
        hasta: Option<NaiveDate>,
        hoy: NaiveDate,
    ) -> Result<ReporteCostos> {
        let mut vehiculo = self
            .vehiculos
            .find_document(patente)
            .await?
            .map(|(_, doc)| vehiculo_from_document(&doc))
            .ok_or_else(|| FlotaError::not_found("Vehículo no encontrado."))?;
        // Legacy records keep a non-plate `_id`; costs and documents are keyed by plate
        let patente = normalize_patente(patente);
        vehiculo.patente = patente.clone();

        let hasta = hasta.unwrap_or(hoy);
        let desde = desde.unwrap_or(hasta - Duration::days(DIAS_PERIODO));
        if desde > hasta {
            return Err(FlotaError::validation(
                "La fecha de inicio no puede ser posterior a la fecha de fin",
            ));
        }

        let filter = Filter::all().patente(&patente);
        let mantenimiento = self.storage.find(Origen::Mantenimiento.collection(), &filter).await?;
        let finanzas = self.storage.find(Origen::Finanzas.collection(), &filter).await?;
        let documentos = self.storage.find(DOCUMENTACION, &filter).await?;

        let mut reporte = reporte_periodo(&patente, &mantenimiento, &finanzas, desde, hasta);
        reporte.alertas = calcular_alertas(&documentos, std::slice::from_ref(&vehiculo), hoy);
        if reporte.omitidos > 0 {
            info!(
                "Reporte {}: {} documentos sin fecha omitidos",
                patente, reporte.omitidos
            );
        }
        Ok(reporte)
    }

    /// Fleet alerts. `dias` is validated for API compatibility; every tracked
    /// type carries its own window.
    pub async fn alertas(&self, dias: i64, hoy: NaiveDate) -> Result<Vec<Alerta>> {
        if dias < 0 {
            return Err(FlotaError::validation("dias debe ser mayor o igual a 0"));
        }
        debug!("Alertas con dias={dias}");
        let documentos = self.storage.find(DOCUMENTACION, &Filter::all()).await?;
        let vehiculos: Vec<_> = self
            .storage
            .find(VEHICULOS, &Filter::all())
            .await?
            .iter()
            .map(vehiculo_from_document)
            .collect();
        Ok(calcular_alertas(&documentos, &vehiculos, hoy))
    }

    pub async fn dashboard(&self, hoy: NaiveDate) -> Result<Dashboard> {
        let vehiculos: Vec<_> = self
            .storage
            .find(VEHICULOS, &Filter::all())
            .await?
            .iter()
            .map(vehiculo_from_document)
            .collect();
        let total_vehiculos = vehiculos.len();
        let vehiculos_activos = vehiculos.iter().filter(|v| v.activo).count();

        let mantenimiento = self
            .storage
            .find(Origen::Mantenimiento.collection(), &Filter::all())
            .await?;
        let finanzas = self
            .storage
            .find(Origen::Finanzas.collection(), &Filter::all())
            .await?;
        let flota = reporte_periodo("", &mantenimiento, &finanzas, hoy - Duration::days(DIAS_PERIODO), hoy);

        let documentos = self.storage.find(DOCUMENTACION, &Filter::all()).await?;
        let alertas_criticas = calcular_alertas(&documentos, &vehiculos, hoy);

        Ok(Dashboard {
            total_vehiculos,
            vehiculos_activos,
            alertas_criticas_count: alertas_criticas.len(),
            alertas_criticas,
            resumen_costos: ResumenCostos {
                total_mantenimiento: flota.total_mantenimiento,
                total_infracciones: flota.total_infracciones,
                total_general: flota.total_general,
            },
        })
    }
}
