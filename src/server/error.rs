use crate::error::Nb2DocxError;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors returned by the HTTP handlers, rendered as
/// `{"error": "...", "details": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No file provided")]
    NoFile,

    #[error("File must be a .ipynb notebook")]
    NotANotebook,

    #[error("Invalid notebook file format")]
    InvalidNotebook(String),

    #[error("Invalid request")]
    InvalidRequest(String),

    #[error("Conversion failed")]
    ConversionFailed(String),

    #[error("Failed to track {0}")]
    Tracking(&'static str),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoFile | Self::NotANotebook | Self::InvalidNotebook(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ConversionFailed(_) | Self::Tracking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::InvalidNotebook(d) | Self::InvalidRequest(d) | Self::ConversionFailed(d) => {
                Some(d.clone())
            }
            _ => None,
        }
    }
}

impl From<Nb2DocxError> for ApiError {
    fn from(e: Nb2DocxError) -> Self {
        match e {
            Nb2DocxError::NotANotebook { .. } => Self::NotANotebook,
            Nb2DocxError::InvalidNotebook { detail } => Self::InvalidNotebook(detail),
            other if other.is_client_error() => Self::InvalidRequest(other.to_string()),
            other => Self::ConversionFailed(other.to_string()),
        }
    }
}

// Extractor rejections would otherwise answer in plain text.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}: {:?}", self, self.details());
        }
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_to_status_codes() {
        let e: ApiError = Nb2DocxError::NotANotebook {
            filename: "a.txt".into(),
        }
        .into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.to_string(), "File must be a .ipynb notebook");

        let e: ApiError = Nb2DocxError::EmptyNotebook.into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.details().as_deref(), Some("No notebook content provided"));

        let e: ApiError = Nb2DocxError::MalformedCell {
            index: 1,
            detail: "expected struct".into(),
        }
        .into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let e: ApiError = Nb2DocxError::PackageFailed("zip".into()).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.details().unwrap().contains("zip"));
    }
}
