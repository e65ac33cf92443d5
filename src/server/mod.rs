//! HTTP surface (feature `server`).
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/convert` | multipart upload → `.docx` download |
//! | `POST /api/convert-json` | JSON request → base64 package |
//! | `GET\|POST /api/track-conversion` | read / bump the conversion counter |
//! | `GET\|POST /api/track-visit` | read / bump the visit counter |
//! | `GET /health` | liveness |

pub mod error;
pub mod handlers;

use crate::config::ConversionConfig;
use crate::counter::{InMemoryCounter, UsageCounter};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Default upload limit: 50 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Base configuration; per-request settings are layered on a copy.
    pub config: Arc<ConversionConfig>,
    pub conversions: Arc<dyn UsageCounter>,
    pub visits: Arc<dyn UsageCounter>,
}

impl AppState {
    /// State with process-local counters.
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config: Arc::new(config),
            conversions: Arc::new(InMemoryCounter::new()),
            visits: Arc::new(InMemoryCounter::new()),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/convert", post(handlers::convert_upload))
        .route("/api/convert-json", post(handlers::convert_json))
        .route(
            "/api/track-conversion",
            get(handlers::get_conversions).post(handlers::track_conversion),
        )
        .route(
            "/api/track-visit",
            get(handlers::get_visits).post(handlers::track_visit),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
