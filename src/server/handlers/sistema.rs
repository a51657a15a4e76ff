use axum::{http::header, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::observability::metrics;

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "API Control de Flota funcionando correctamente"
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn prometheus() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
