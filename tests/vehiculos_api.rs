mod common;

use axum::http::StatusCode;
use chrono::{Duration, Local};
use common::{app, call};
use serde_json::json;
use tempfile::tempdir;

#[tokio::test]
async fn test_root_and_health() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());

    let root = call(&app, "GET", "/", None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.json()["status"], "ok");

    let health = call(&app, "GET", "/health", None).await;
    assert_eq!(health.json()["service"], "flota");
    assert!(health.json()["version"].is_string());
}

#[tokio::test]
async fn test_vehicle_crud() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());

    let created = call(
        &app,
        "POST",
        "/vehiculos",
        Some(json!({"patente": "ab-123 cd", "anio": 2019, "nro_movil": "12", "descripcion_modelo": "Toyota Hilux"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let body = created.json();
    assert_eq!(body["_id"], "AB123CD");
    assert_eq!(body["activo"], true);
    assert_eq!(body["tipo_combustible"], "Nafta");
    assert_eq!(body["anio"], 2019);

    let duplicate = call(&app, "POST", "/vehiculos", Some(json!({"patente": "AB123CD"}))).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert!(duplicate.json()["detail"].as_str().unwrap().contains("AB123CD"));

    let fetched = call(&app, "GET", "/vehiculos/ab123cd", None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["nro_movil"], "12");

    let updated = call(
        &app,
        "PATCH",
        "/vehiculos/AB123CD",
        Some(json!({"color": "Blanco", "activo": false})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["color"], "Blanco");
    assert_eq!(updated.json()["activo"], false);

    let unchanged = call(&app, "PUT", "/vehiculos/AB123CD", Some(json!({}))).await;
    assert_eq!(unchanged.json()["color"], "Blanco");

    let deleted = call(&app, "DELETE", "/vehiculos/AB123CD", None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = call(&app, "GET", "/vehiculos/AB123CD", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.json()["detail"].is_string());
}

#[tokio::test]
async fn test_list_paging_and_filter() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());
    for (patente, movil, modelo) in [
        ("AA111AA", "1", "Ford Ranger"),
        ("BB222BB", "2", "Toyota Hilux"),
        ("CC333CC", "3", "Toyota Etios"),
    ] {
        let r = call(
            &app,
            "POST",
            "/vehiculos",
            Some(json!({"patente": patente, "nro_movil": movil, "descripcion_modelo": modelo})),
        )
        .await;
        assert_eq!(r.status, StatusCode::CREATED);
    }

    let all = call(&app, "GET", "/vehiculos", None).await.json();
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert_eq!(all[0]["_id"], "AA111AA");

    let page = call(&app, "GET", "/vehiculos?skip=1&limit=1", None).await.json();
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["_id"], "BB222BB");

    let toyota = call(&app, "GET", "/vehiculos?filtro=toyota", None).await.json();
    assert_eq!(toyota.as_array().unwrap().len(), 2);

    // Regex metacharacters are matched literally
    let literal = call(&app, "GET", "/vehiculos?filtro=.*", None).await.json();
    assert!(literal.as_array().unwrap().is_empty());

    let bad_limit = call(&app, "GET", "/vehiculos?limit=0", None).await;
    assert_eq!(bad_limit.status, StatusCode::BAD_REQUEST);
    let bad_skip = call(&app, "GET", "/vehiculos?skip=-1", None).await;
    assert_eq!(bad_skip.status, StatusCode::BAD_REQUEST);
    let not_a_number = call(&app, "GET", "/vehiculos?limit=abc", None).await;
    assert_eq!(not_a_number.status, StatusCode::BAD_REQUEST);
    assert!(not_a_number.json()["detail"].is_string());
}

#[tokio::test]
async fn test_documentacion_and_alerts() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());
    call(
        &app,
        "POST",
        "/vehiculos",
        Some(json!({"patente": "AB123CD", "nro_movil": "7", "descripcion_modelo": "Hilux"})),
    )
    .await;

    let hoy = Local::now().date_naive();
    let vtv = (hoy + Duration::days(10)).format("%Y-%m-%d").to_string();
    let poliza = (hoy - Duration::days(1)).format("%d/%m/%Y").to_string();

    let none = call(&app, "GET", "/documentacion/AB123CD", None).await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    let r = call(
        &app,
        "POST",
        "/documentacion/AB123CD",
        Some(json!({"tipo_documento": "VTV", "fecha_vencimiento": "2099-01-01"})),
    )
    .await;
    assert_eq!(r.status, StatusCode::CREATED);
    call(
        &app,
        "POST",
        "/documentacion/AB123CD",
        Some(json!({"tipo_documento": "Poliza_Detalle", "fecha_vencimiento": poliza, "aseguradora": "La Segunda"})),
    )
    .await;

    let update = call(
        &app,
        "PUT",
        "/documentacion/AB123CD/VTV",
        Some(json!({"fecha_vencimiento": vtv})),
    )
    .await;
    assert_eq!(update.status, StatusCode::OK);

    let docs = call(&app, "GET", "/documentacion/AB123CD", None).await.json();
    assert_eq!(docs.as_array().unwrap().len(), 2);

    // Untracked types never raise alerts
    let cedula = (hoy + Duration::days(5)).format("%Y-%m-%d").to_string();
    let r = call(
        &app,
        "POST",
        "/documentacion/AB123CD",
        Some(json!({"tipo_documento": "Cedula Verde", "fecha_vencimiento": cedula})),
    )
    .await;
    assert_eq!(r.status, StatusCode::CREATED);

    let alertas = call(&app, "GET", "/alertas/criticas?dias=90", None).await.json();
    let alertas = alertas.as_array().unwrap();
    assert_eq!(alertas.len(), 2);
    assert_eq!(alertas[0]["prioridad"], "CRÍTICA");
    assert_eq!(alertas[0]["mensaje"], "EXPIRADO");
    assert_eq!(alertas[0]["movil_nro"], "7");
    assert_eq!(alertas[1]["prioridad"], "ALTA");
    assert_eq!(alertas[1]["mensaje"], "Vence en 10 días");

    let dashboard = call(&app, "GET", "/dashboard/resumen", None).await.json();
    assert_eq!(dashboard["total_vehiculos"], 1);
    assert_eq!(dashboard["vehiculos_activos"], 1);
    assert_eq!(dashboard["alertas_criticas_count"], 2);

    let missing = call(
        &app,
        "PUT",
        "/documentacion/AB123CD/GAS",
        Some(json!({"fecha_vencimiento": vtv})),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let negative = call(&app, "GET", "/alertas/criticas?dias=-1", None).await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_rejected_with_detail() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/vehiculos")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let resp = common::send(&app, req).await;
    assert!(resp.status.is_client_error());
    assert!(resp.json()["detail"].is_string());
}

#[tokio::test]
async fn test_metrics_endpoint_is_text() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());
    let resp = call(&app, "GET", "/metrics", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.header("content-type").starts_with("text/plain"));
}
