//! HTTP surface tests, driven through the router without a socket.
#![cfg(feature = "server")]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use nb2docx::server::{build_router, AppState, DEFAULT_MAX_UPLOAD_BYTES};
use nb2docx::{ConversionConfig, UsageCounter};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "nb2docx-test-boundary";

fn app() -> (AppState, Router) {
    let state = AppState::new(ConversionConfig::default());
    let router = build_router(state.clone(), DEFAULT_MAX_UPLOAD_BYTES);
    (state, router)
}

fn notebook() -> String {
    json!({
        "cells": [
            {"cell_type": "markdown", "source": "# Upload"},
            {"cell_type": "code", "source": "print('hi')", "outputs": [
                {"output_type": "stream", "name": "stdout", "text": "hi\n"}
            ]}
        ]
    })
    .to_string()
}

/// `(name, filename, content)` parts → multipart body.
fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match filename {
            Some(f) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::post("/api/convert")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, app) = app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

// ── Multipart upload ─────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_returns_docx_and_counts_conversion() {
    let (state, app) = app();
    let nb = notebook();
    let response = app
        .oneshot(multipart(&[
            ("notebook", Some("week1.ipynb"), &nb),
            ("labInfo", None, r#"{"labTitle": "Week 1"}"#),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"week1.docx\""
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
    assert_eq!(state.conversions.get(), 1);
}

#[tokio::test]
async fn upload_with_bad_lab_info_still_converts() {
    let (_, app) = app();
    let nb = notebook();
    let response = app
        .oneshot(multipart(&[
            ("notebook", Some("week1.ipynb"), &nb),
            ("labInfo", None, "{not json"),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let (state, app) = app();
    let response = app
        .oneshot(multipart(&[("labInfo", None, "{}")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No file provided");
    assert_eq!(state.conversions.get(), 0);
}

#[tokio::test]
async fn upload_with_wrong_extension_is_rejected() {
    let (_, app) = app();
    let nb = notebook();
    let response = app
        .oneshot(multipart(&[("notebook", Some("week1.json"), &nb)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "File must be a .ipynb notebook"
    );
}

#[tokio::test]
async fn upload_with_malformed_notebook_has_details() {
    let (_, app) = app();
    let response = app
        .oneshot(multipart(&[("notebook", Some("broken.ipynb"), "{\"cells\": 5")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid notebook file format");
    assert!(body["details"].is_string());
}

// ── JSON conversion ──────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_json_returns_base64_document() {
    let (_, app) = app();
    let request = json!({
        "notebook_content": notebook(),
        "filename": "lab2.ipynb",
        "lab_info": {
            "labTitle": "Lab 2",
            "footerCenter": {"type": "page_number", "customText": "", "pageFormat": "roman"}
        }
    });
    let response = app
        .oneshot(json_request("/api/convert-json", request.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["filename"], "lab2.docx");
    let bytes = STANDARD.decode(body["document"].as_str().unwrap()).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn convert_json_rejects_bad_filename_and_empty_content() {
    let (_, app) = app();
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/convert-json",
            json!({"notebook_content": notebook(), "filename": "lab2.txt"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "/api/convert-json",
            json!({"notebook_content": "", "filename": "lab2.ipynb"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn convert_json_rejects_unparseable_body_as_json_error() {
    let (_, app) = app();
    let response = app
        .clone()
        .oneshot(json_request("/api/convert-json", "{oops".into()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid request");
    assert!(body["details"].is_string());

    let response = app
        .oneshot(json_request(
            "/api/convert-json",
            json!({"notebook_content": "{\"cells\": []}"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid request");
    assert!(body["details"].as_str().unwrap().contains("filename"));
}

#[tokio::test]
async fn convert_json_misshapen_cell_is_server_error() {
    let (_, app) = app();
    let response = app
        .oneshot(json_request(
            "/api/convert-json",
            json!({"notebook_content": "{\"cells\": [42]}", "filename": "lab.ipynb"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Conversion failed");
}

#[tokio::test]
async fn upload_without_multipart_body_is_json_error() {
    let (_, app) = app();
    let response = app
        .oneshot(json_request("/api/convert", "{}".into()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid request");
}

// ── Counters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn visit_and_conversion_counters() {
    let (_, app) = app();

    for expected in 1..=2 {
        let response = app
            .clone()
            .oneshot(Request::post("/api/track-visit").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["totalVisits"], expected);
    }

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/track-conversion")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(response).await["filesConverted"], 1);

    let response = app
        .oneshot(Request::get("/api/track-visit").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body.get("success").is_none());
    assert_eq!(body["totalVisits"], 2);
    assert_eq!(body["filesConverted"], 1);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}
