//! HTTP request handlers.

use super::error::ApiError;
use super::AppState;
use crate::config::DocumentSettings;
use crate::convert::{convert_notebook, convert_request};
use crate::counter::{timestamp, UsageCounter};
use crate::output::{ConvertRequest, ConvertResponse, DOCX_MIME};
use crate::pipeline::input;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionCount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub files_converted: u64,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitCount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub total_visits: u64,
    pub files_converted: u64,
    pub timestamp: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Multipart upload: a `notebook` file part and an optional `labInfo` JSON
/// text part. Returns the `.docx` package.
pub async fn convert_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart?;
    let mut notebook: Option<(String, Vec<u8>)> = None;
    let mut lab_info: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    {
        match field.name() {
            Some("notebook") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                notebook = Some((filename, bytes.to_vec()));
            }
            Some("labInfo") => {
                lab_info = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (filename, bytes) = notebook.ok_or(ApiError::NoFile)?;
    input::validate_filename(&filename).map_err(|_| ApiError::NotANotebook)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| ApiError::InvalidNotebook(format!("not UTF-8 text: {e}")))?;

    let config = match lab_info.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(json) => match DocumentSettings::from_json(json) {
            Ok(settings) => state.config.with_settings(settings)?,
            Err(e) => {
                warn!("Could not parse labInfo, using defaults: {}", e);
                (*state.config).clone()
            }
        },
        None => (*state.config).clone(),
    };

    info!("Upload conversion: '{}' ({} bytes)", filename, content.len());
    let output = tokio::task::spawn_blocking(move || convert_notebook(&content, &filename, &config))
        .await
        .map_err(|e| ApiError::ConversionFailed(format!("conversion task failed: {e}")))??;

    record(state.conversions.as_ref(), "conversion");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.filename),
            ),
            (header::CONTENT_LENGTH, output.document.len().to_string()),
        ],
        output.document,
    ))
}

/// JSON conversion: `{notebook_content, filename, lab_info?}` →
/// `{document: <base64>, filename}`.
pub async fn convert_json(
    State(state): State<AppState>,
    request: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let Json(request) = request?;
    info!("JSON conversion: '{}'", request.filename);
    let base = state.config.clone();
    let response = tokio::task::spawn_blocking(move || convert_request(request, &base))
        .await
        .map_err(|e| ApiError::ConversionFailed(format!("conversion task failed: {e}")))??;
    Ok(Json(response))
}

pub async fn get_conversions(State(state): State<AppState>) -> Json<ConversionCount> {
    Json(ConversionCount {
        success: None,
        files_converted: state.conversions.get(),
        timestamp: timestamp(Utc::now()),
    })
}

pub async fn track_conversion(
    State(state): State<AppState>,
) -> Result<Json<ConversionCount>, ApiError> {
    let total = state.conversions.increment().map_err(|e| {
        warn!("Failed to track conversion: {}", e);
        ApiError::Tracking("conversion")
    })?;
    info!("File conversion tracked! Total conversions: {}", total);
    Ok(Json(ConversionCount {
        success: Some(true),
        files_converted: total,
        timestamp: timestamp(Utc::now()),
    }))
}

pub async fn get_visits(State(state): State<AppState>) -> Json<VisitCount> {
    Json(VisitCount {
        success: None,
        total_visits: state.visits.get(),
        files_converted: state.conversions.get(),
        timestamp: last_updated(&state),
    })
}

pub async fn track_visit(State(state): State<AppState>) -> Result<Json<VisitCount>, ApiError> {
    let total = state.visits.increment().map_err(|e| {
        warn!("Failed to track visit: {}", e);
        ApiError::Tracking("visit")
    })?;
    info!("Page visit tracked! Total visits: {}", total);
    Ok(Json(VisitCount {
        success: Some(true),
        total_visits: total,
        files_converted: state.conversions.get(),
        timestamp: last_updated(&state),
    }))
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Best-effort increment; failures are logged and swallowed.
fn record(counter: &dyn UsageCounter, what: &str) {
    match counter.increment() {
        Ok(total) => info!("{} tracked, total {}", what, total),
        Err(e) => warn!("Failed to track {}: {}", what, e),
    }
}

fn last_updated(state: &AppState) -> String {
    let latest = [state.visits.last_updated(), state.conversions.last_updated()]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or_else(Utc::now);
    timestamp(latest)
}
