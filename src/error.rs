//! Error types for the nb2docx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Nb2DocxError`] — **Fatal**: the conversion cannot proceed at all
//!   (missing file, not a notebook, malformed JSON, package writer failure).
//!   Returned as `Err(Nb2DocxError)` from the top-level `convert*` functions.
//!   There is no partial document: a request either yields a complete package
//!   or no package at all.
//!
//! * [`RenderWarning`] — **Non-fatal**: a single output could not be rendered
//!   as intended (an image payload that does not decode, an SVG figure) and a
//!   placeholder paragraph was emitted instead. Stored inside
//!   [`crate::output::ConversionOutput`] so callers can report what degraded.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the nb2docx library.
///
/// Recovered rendering problems use [`RenderWarning`] and are stored in
/// [`crate::output::ConversionOutput::warnings`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Nb2DocxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Notebook file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file name does not carry the `.ipynb` extension.
    #[error("File must be a .ipynb notebook, got '{filename}'")]
    NotANotebook { filename: String },

    // ── Notebook errors ───────────────────────────────────────────────────
    /// A conversion request arrived without any notebook text.
    #[error("No notebook content provided")]
    EmptyNotebook,

    /// The notebook is not valid JSON or lacks a `cells` array.
    #[error("Invalid notebook file format: {detail}")]
    InvalidNotebook { detail: String },

    /// A cell (1-indexed) or one of its outputs has an unexpected shape.
    /// The notebook was readable, so this is a rendering failure.
    #[error("Cell {index} has an unexpected shape: {detail}")]
    MalformedCell { index: usize, detail: String },

    // ── Package errors ────────────────────────────────────────────────────
    /// The document package writer failed to produce a `.docx` byte stream.
    #[error("Failed to write document package: {0}")]
    PackageFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output `.docx` file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Nb2DocxError {
    /// Whether the error was caused by the caller's input rather than by the
    /// converter itself.
    ///
    /// Input validation errors map to HTTP 400; everything else is an
    /// internal failure (HTTP 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Nb2DocxError::FileNotFound { .. }
                | Nb2DocxError::PermissionDenied { .. }
                | Nb2DocxError::InvalidInput { .. }
                | Nb2DocxError::DownloadFailed { .. }
                | Nb2DocxError::DownloadTimeout { .. }
                | Nb2DocxError::NotANotebook { .. }
                | Nb2DocxError::EmptyNotebook
                | Nb2DocxError::InvalidNotebook { .. }
                | Nb2DocxError::InvalidConfig(_)
        )
    }
}

impl From<serde_json::Error> for Nb2DocxError {
    fn from(e: serde_json::Error) -> Self {
        Nb2DocxError::InvalidNotebook {
            detail: e.to_string(),
        }
    }
}

/// A non-fatal rendering problem for a single cell output.
///
/// The conversion always continues; the affected output is rendered as a
/// centered italic placeholder instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum RenderWarning {
    /// A PNG/JPEG payload failed base64 or image decoding.
    #[error("Cell {cell}: {kind} image could not be decoded: {detail}")]
    ImageDecodeFailed {
        cell: usize,
        kind: String,
        detail: String,
    },

    /// An SVG figure was replaced by a placeholder.
    #[error("Cell {cell}: SVG figure replaced by a placeholder")]
    SvgUnsupported { cell: usize },
}
