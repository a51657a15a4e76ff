#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use flota::server::{create_router, AppState};
use flota_core::storage::{InMemoryBlobStore, InMemoryStorage};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "flota-test-boundary";

pub fn app(media_root: &Path) -> Router {
    let state = AppState::new(
        Arc::new(InMemoryStorage::new()),
        Arc::new(InMemoryBlobStore::new()),
        media_root,
        1024 * 1024,
    );
    create_router(state, &[])
}

pub struct Respuesta {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl Respuesta {
    pub fn json(&self) -> Value {
        if self.bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&self.bytes).unwrap()
        }
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).unwrap().to_str().unwrap()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Respuesta {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec();
    Respuesta {
        status,
        headers,
        bytes,
    }
}

pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Respuesta {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(app, req).await
}

/// A `multipart/form-data` body with text fields and `(field, filename, content type, bytes)` files
pub fn multipart_body(campos: &[(&str, &str)], archivos: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in campos {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, bytes) in archivos {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn call_multipart(
    app: &Router,
    method: &str,
    uri: &str,
    campos: &[(&str, &str)],
    archivos: &[(&str, &str, &str, &[u8])],
) -> Respuesta {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(campos, archivos)))
        .unwrap();
    send(app, req).await
}
