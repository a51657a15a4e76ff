//! Prometheus metrics for the API.
//!
//! The recorder is installed once per process; `/metrics` renders it in-process.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Every metric name the service emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    HttpRequests,
    HttpRequestDuration,
    VehiculosCreados,
    VehiculosEliminados,
    CostosCreados,
    CostosEliminados,
    CostosLimpiados,
    ArchivosSubidos,
    ArchivosSubidosBytes,
    ArchivosDescargados,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::HttpRequests => "flota_http_requests_total",
            MetricName::HttpRequestDuration => "flota_http_request_duration_seconds",
            MetricName::VehiculosCreados => "flota_vehiculos_creados_total",
            MetricName::VehiculosEliminados => "flota_vehiculos_eliminados_total",
            MetricName::CostosCreados => "flota_costos_creados_total",
            MetricName::CostosEliminados => "flota_costos_eliminados_total",
            MetricName::CostosLimpiados => "flota_costos_limpiados_total",
            MetricName::ArchivosSubidos => "flota_archivos_subidos_total",
            MetricName::ArchivosSubidosBytes => "flota_archivos_subidos_bytes",
            MetricName::ArchivosDescargados => "flota_archivos_descargados_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder. Idempotent; later calls are no-ops.
pub fn init() {
    HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    });
}

/// Text exposition of every recorded metric, empty when no recorder is installed
pub fn render() -> String {
    HANDLE
        .get()
        .and_then(Option::as_ref)
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

pub mod http {
    use super::MetricName;

    pub fn request_completed(method: &str, status: u16, duration_secs: f64) {
        ::metrics::counter!(
            MetricName::HttpRequests.as_str(),
            "method" => method.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        ::metrics::histogram!(MetricName::HttpRequestDuration.as_str()).record(duration_secs);
    }
}

pub mod vehiculos {
    use super::MetricName;

    pub fn created() {
        ::metrics::counter!(MetricName::VehiculosCreados.as_str()).increment(1);
    }

    pub fn deleted() {
        ::metrics::counter!(MetricName::VehiculosEliminados.as_str()).increment(1);
    }
}

pub mod costos {
    use super::MetricName;

    pub fn created(origen: &str) {
        ::metrics::counter!(MetricName::CostosCreados.as_str(), "origen" => origen.to_string())
            .increment(1);
    }

    pub fn deleted(origen: &str) {
        ::metrics::counter!(MetricName::CostosEliminados.as_str(), "origen" => origen.to_string())
            .increment(1);
    }

    pub fn cleaned(count: usize) {
        ::metrics::counter!(MetricName::CostosLimpiados.as_str()).increment(count as u64);
    }
}

pub mod archivos {
    use super::MetricName;

    pub fn uploaded(kind: &'static str, bytes: usize) {
        ::metrics::counter!(MetricName::ArchivosSubidos.as_str(), "tipo" => kind).increment(1);
        ::metrics::histogram!(MetricName::ArchivosSubidosBytes.as_str()).record(bytes as f64);
    }

    pub fn downloaded(kind: &'static str) {
        ::metrics::counter!(MetricName::ArchivosDescargados.as_str(), "tipo" => kind).increment(1);
    }
}
