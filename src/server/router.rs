use axum::{
    extract::{DefaultBodyLimit, Request},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
    Router,
};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::{archivos, costos, documentacion, polizas, reportes, sistema, vehiculos};
use super::state::AppState;
use crate::observability::metrics;

/// Room for the multipart framing around a maximum-size upload
const BODY_OVERHEAD: usize = 1024 * 1024;

async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let response = next.run(req).await;
    metrics::http::request_completed(
        &method,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Every API route over the given state
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let body_limit = state.max_upload_bytes + BODY_OVERHEAD;

    Router::new()
        .route("/", get(sistema::root))
        .route("/health", get(sistema::health))
        .route("/metrics", get(sistema::prometheus))
        // Vehicles
        .route("/vehiculos", get(vehiculos::listar).post(vehiculos::crear))
        .route(
            "/vehiculos/:patente",
            get(vehiculos::obtener)
                .patch(vehiculos::actualizar)
                .put(vehiculos::actualizar)
                .delete(vehiculos::eliminar),
        )
        // Reports and alerts
        .route("/vehiculos/:patente/reporte", get(reportes::reporte_vehiculo))
        .route("/reportes/vehiculo/:patente", get(reportes::reporte_vehiculo))
        .route("/dashboard", get(reportes::dashboard))
        .route("/dashboard/resumen", get(reportes::dashboard))
        .route("/alertas/criticas", get(reportes::alertas_criticas))
        // Expenses
        .route("/costos/manual", post(costos::crear_manual))
        .route("/costos/manual/:id", axum::routing::delete(costos::eliminar_manual))
        .route("/costos/unificado/:patente", get(costos::unificado))
        .route("/costos/universal/:id", axum::routing::delete(costos::eliminar_universal))
        .route("/costos/limpiar-basura", post(costos::limpiar_basura))
        .route("/monto/:coleccion/:id", patch(costos::actualizar_monto))
        // Insurance policies
        .route("/polizas", get(polizas::listar).post(polizas::crear))
        .route("/polizas/:id", put(polizas::actualizar).delete(polizas::eliminar))
        // Expiry records
        .route(
            "/documentacion/:patente",
            get(documentacion::listar).post(documentacion::crear),
        )
        .route(
            "/documentacion/:patente/:tipo_documento",
            put(documentacion::actualizar_vencimiento),
        )
        // Files
        .route("/api/archivos/descargar/:file_id", get(archivos::descargar_blob))
        .route("/api/archivos/descargar", get(archivos::descargar_archivo))
        .route("/api/archivos/subir-documento", post(archivos::subir_documento))
        .route(
            "/api/archivos/eliminar-archivo",
            axum::routing::delete(archivos::eliminar_archivo),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
