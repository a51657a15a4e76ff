mod common;

use axum::http::StatusCode;
use common::{app, call, call_multipart};
use serde_json::json;
use tempfile::tempdir;

#[tokio::test]
async fn test_polizas_lifecycle() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());

    let creada = call_multipart(
        &app,
        "POST",
        "/polizas",
        &[("empresa", "La Segunda"), ("numero_poliza", "P-100")],
        &[("file", "poliza.pdf", "application/pdf", b"%PDF-poliza")],
    )
    .await;
    assert_eq!(creada.status, StatusCode::CREATED);
    let poliza = creada.json();
    let id = poliza["id"].as_str().unwrap().to_string();
    let file_id = poliza["file_id"].as_str().unwrap().to_string();

    let duplicada = call_multipart(
        &app,
        "POST",
        "/polizas",
        &[("empresa", "Otra"), ("numero_poliza", "P-100")],
        &[("file", "otra.pdf", "application/pdf", b"%PDF")],
    )
    .await;
    assert_eq!(duplicada.status, StatusCode::CONFLICT);

    let sin_archivo = call_multipart(
        &app,
        "POST",
        "/polizas",
        &[("empresa", "Otra"), ("numero_poliza", "P-200")],
        &[],
    )
    .await;
    assert_eq!(sin_archivo.status, StatusCode::BAD_REQUEST);

    let preview = call(
        &app,
        "GET",
        &format!("/api/archivos/descargar/{file_id}?preview=true"),
        None,
    )
    .await;
    assert_eq!(preview.status, StatusCode::OK);
    assert_eq!(preview.bytes, b"%PDF-poliza");
    assert_eq!(preview.header("content-type"), "application/pdf");
    assert!(preview.header("content-disposition").starts_with("inline"));

    let attachment = call(&app, "GET", &format!("/api/archivos/descargar/{file_id}"), None).await;
    assert_eq!(
        attachment.header("content-disposition"),
        "attachment; filename=\"poliza.pdf\""
    );

    let actualizada = call_multipart(
        &app,
        "PUT",
        &format!("/polizas/{id}"),
        &[("empresa", "La Segunda Seguros"), ("numero_poliza", "P-100")],
        &[("file", "nueva.png", "image/png", b"\x89PNG")],
    )
    .await;
    assert_eq!(actualizada.status, StatusCode::OK);
    let nuevo_file_id = actualizada.json()["file_id"].as_str().unwrap().to_string();
    assert_ne!(nuevo_file_id, file_id);

    // The replaced file is gone
    let viejo = call(&app, "GET", &format!("/api/archivos/descargar/{file_id}"), None).await;
    assert_eq!(viejo.status, StatusCode::NOT_FOUND);

    let listado = call(&app, "GET", "/polizas", None).await.json();
    assert_eq!(listado.as_array().unwrap().len(), 1);
    assert_eq!(listado[0]["empresa"], "La Segunda Seguros");

    let eliminada = call(&app, "DELETE", &format!("/polizas/{id}"), None).await;
    assert_eq!(eliminada.status, StatusCode::OK);
    let otra_vez = call(&app, "DELETE", &format!("/polizas/{id}"), None).await;
    assert_eq!(otra_vez.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_name_has_no_directories() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());

    let creada = call_multipart(
        &app,
        "POST",
        "/polizas",
        &[("empresa", "La Segunda"), ("numero_poliza", "P-300")],
        &[("file", "../../.bashrc", "application/pdf", b"%PDF")],
    )
    .await;
    assert_eq!(creada.status, StatusCode::CREATED);
    let file_id = creada.json()["file_id"].as_str().unwrap().to_string();

    let descarga = call(&app, "GET", &format!("/api/archivos/descargar/{file_id}"), None).await;
    assert_eq!(descarga.status, StatusCode::OK);
    assert_eq!(
        descarga.header("content-disposition"),
        "attachment; filename=\".bashrc\""
    );
}

#[tokio::test]
async fn test_media_upload_download_delete() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());
    call(&app, "POST", "/vehiculos", Some(json!({"patente": "AB123CD"}))).await;

    let subido = call_multipart(
        &app,
        "POST",
        "/api/archivos/subir-documento",
        &[("patente", "ab-123-cd"), ("tipo", "VTV")],
        &[("file", "vtv.pdf", "application/pdf", b"%PDF-vtv")],
    )
    .await;
    assert_eq!(subido.status, StatusCode::CREATED);
    let body = subido.json();
    assert_eq!(body["path_relativo"], "AB123CD/vtv.pdf");
    assert_eq!(body["registrado_en_vehiculo"], true);
    assert!(dir
        .path()
        .join("Documentos-Digitales/AB123CD/vtv.pdf")
        .is_file());

    let vehiculo = call(&app, "GET", "/vehiculos/AB123CD", None).await.json();
    assert_eq!(vehiculo["documentos_digitales"][0]["tipo"], "VTV");
    assert_eq!(vehiculo["documentos_digitales"][0]["nombre_archivo"], "vtv.pdf");

    let descarga = call(
        &app,
        "GET",
        "/api/archivos/descargar?path_relativo=Documentos-Digitales/AB123CD/vtv.pdf",
        None,
    )
    .await;
    assert_eq!(descarga.status, StatusCode::OK);
    assert_eq!(descarga.bytes, b"%PDF-vtv");

    let traversal = call(
        &app,
        "GET",
        "/api/archivos/descargar?path_relativo=../secret.txt",
        None,
    )
    .await;
    assert_eq!(traversal.status, StatusCode::BAD_REQUEST);

    let empty = call(&app, "GET", "/api/archivos/descargar?path_relativo=", None).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let borrado = call(
        &app,
        "DELETE",
        "/api/archivos/eliminar-archivo?path_relativo=AB123CD/vtv.pdf",
        None,
    )
    .await;
    assert_eq!(borrado.status, StatusCode::OK);
    assert!(!dir.path().join("Documentos-Digitales/AB123CD").exists());
    assert!(dir.path().join("Documentos-Digitales").exists());

    let missing = call(
        &app,
        "DELETE",
        "/api/archivos/eliminar-archivo?path_relativo=AB123CD/vtv.pdf",
        None,
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_for_unknown_vehicle_is_saved_but_not_registered() {
    let dir = tempdir().unwrap();
    let app = app(dir.path());

    let subido = call_multipart(
        &app,
        "POST",
        "/api/archivos/subir-documento",
        &[("patente", "ZZ999ZZ")],
        &[("file", "foto.jpg", "image/jpeg", b"\xFF\xD8")],
    )
    .await;
    assert_eq!(subido.status, StatusCode::CREATED);
    assert_eq!(subido.json()["registrado_en_vehiculo"], false);

    let rechazado = call_multipart(
        &app,
        "POST",
        "/api/archivos/subir-documento",
        &[("patente", "ZZ999ZZ")],
        &[("file", "notas.txt", "text/plain", b"hola")],
    )
    .await;
    assert_eq!(rechazado.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        rechazado.json()["detail"],
        "Tipo de archivo no permitido (solo PDF, JPG, PNG)"
    );
}
