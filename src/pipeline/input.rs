//! Input resolution: turn a user-supplied path or URL into notebook text plus
//! the filename it should be known by.
//!
//! Notebooks are small JSON documents, so both sources are read fully into
//! memory. The filename matters downstream: it must end in `.ipynb`, it feeds
//! `filename` header/footer fields, and it names the output document.

use crate::error::Nb2DocxError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const NOTEBOOK_EXTENSION: &str = ".ipynb";

/// Notebook text together with its source filename (no directory part).
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub content: String,
    pub filename: String,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Reject filenames that do not carry the notebook extension.
///
/// The check is a case-sensitive suffix match, applied before any parsing.
pub fn validate_filename(filename: &str) -> Result<(), Nb2DocxError> {
    if filename.ends_with(NOTEBOOK_EXTENSION) {
        Ok(())
    } else {
        Err(Nb2DocxError::NotANotebook {
            filename: filename.to_string(),
        })
    }
}

/// Resolve the input string to notebook text.
///
/// URLs are downloaded with the given timeout; anything else is treated as a
/// local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Nb2DocxError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input).await
    }
}

async fn resolve_local(path_str: &str) -> Result<ResolvedInput, Nb2DocxError> {
    if path_str.trim().is_empty() {
        return Err(Nb2DocxError::InvalidInput {
            input: path_str.to_string(),
        });
    }
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Nb2DocxError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(Nb2DocxError::InvalidInput {
            input: path_str.to_string(),
        });
    }

    let content = match tokio::fs::read(&path).await {
        Ok(bytes) => String::from_utf8(bytes).map_err(|e| Nb2DocxError::InvalidNotebook {
            detail: format!("not UTF-8 text: {e}"),
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Nb2DocxError::PermissionDenied { path });
        }
        Err(_) => return Err(Nb2DocxError::FileNotFound { path }),
    };

    debug!("Read local notebook: {} ({} bytes)", path.display(), content.len());
    Ok(ResolvedInput {
        filename: file_name_of(&path),
        content,
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Nb2DocxError> {
    info!("Downloading notebook from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Nb2DocxError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Nb2DocxError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Nb2DocxError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Nb2DocxError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let content = response.text().await.map_err(|e| Nb2DocxError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    info!("Downloaded {} bytes", content.len());
    Ok(ResolvedInput {
        filename: filename_from_url(url),
        content,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Last non-empty path segment of the URL, or `downloaded.ipynb`.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(last) = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
        {
            if !last.is_empty() && last.contains('.') {
                return last.to_string();
            }
        }
    }
    format!("downloaded{NOTEBOOK_EXTENSION}")
}
