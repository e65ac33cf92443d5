//! Conversion entry points.
//!
//! [`convert_notebook`] is the synchronous core: notebook text + filename in,
//! `.docx` bytes out. Everything else wraps it: [`convert`] resolves a path
//! or URL first, [`convert_to_file`] writes the package atomically via [`write_package`],
//! [`convert_request`] speaks the JSON request/response shape used by the
//! HTTP surface.
//!
//! A conversion either yields a complete package or an error. Recovered
//! problems (undecodable images, SVG figures) are reported in
//! [`ConversionOutput::warnings`].

use crate::config::ConversionConfig;
use crate::error::Nb2DocxError;
use crate::notebook::parse_notebook;
use crate::output::{ConversionOutput, ConversionStats, ConvertRequest, ConvertResponse, NotebookSummary};
use crate::pipeline::assemble::{self, RenderContext};
use crate::pipeline::input::{self, NOTEBOOK_EXTENSION};
use crate::pipeline::outputs::ImageSize;
use crate::pipeline::package;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert notebook text to a `.docx` package.
///
/// # Arguments
/// * `content`  — notebook JSON text
/// * `filename` — the notebook's filename; must end in `.ipynb`
/// * `config`   — conversion configuration
///
/// # Errors
/// * [`Nb2DocxError::NotANotebook`] — `filename` lacks the `.ipynb` suffix
///   (checked before parsing)
/// * [`Nb2DocxError::InvalidNotebook`] — the text is not a notebook
/// * [`Nb2DocxError::MalformedCell`] — a cell has an unexpected shape
/// * [`Nb2DocxError::PackageFailed`] — the package writer failed
pub fn convert_notebook(
    content: &str,
    filename: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Nb2DocxError> {
    let start = Instant::now();
    input::validate_filename(filename)?;
    if content.is_empty() {
        return Err(Nb2DocxError::EmptyNotebook);
    }

    let notebook = parse_notebook(content)?;
    info!(
        "Converting '{}': {} cells, title '{}'",
        filename,
        notebook.cells.len(),
        config.title
    );

    let now = config
        .timestamp
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let rendered = assemble::render_notebook(
        &notebook,
        &RenderContext {
            title: &config.title,
            filename,
            header_footer: &config.header_footer,
            image_size: ImageSize {
                width: config.image_width,
                height: config.image_height,
            },
            margin_twips: config.margin_twips,
            now,
            progress: config.progress_callback.as_deref(),
        },
    );
    debug!(
        "Rendered {} body blocks, {} code cells labelled",
        rendered.tree.body.len(),
        rendered.next_execution_count - 1
    );

    let document = package::to_docx(&rendered.tree)?;

    let stats = ConversionStats {
        package_bytes: document.len(),
        duration_ms: start.elapsed().as_millis() as u64,
        ..rendered.stats
    };
    info!(
        "Conversion complete: {} bytes, {} images, {} placeholders, {}ms",
        stats.package_bytes, stats.images_embedded, stats.image_fallbacks, stats.duration_ms
    );

    Ok(ConversionOutput {
        document,
        filename: docx_filename(filename),
        title: config.title.clone(),
        stats,
        warnings: rendered.warnings,
    })
}

/// Convert a notebook file or URL to a `.docx` package.
///
/// # Arguments
/// * `input`  — local path or HTTP/HTTPS URL of a `.ipynb` file
/// * `config` — conversion configuration
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Nb2DocxError> {
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    convert_notebook(&resolved.content, &resolved.filename, config)
}

/// Convert a notebook and write the package directly to a file.
///
/// The package is written to a temporary file in the destination directory
/// and persisted into place, so a failed run never leaves a partial file.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Nb2DocxError> {
    let output = convert(input_str, config).await?;
    write_package(output_path.as_ref(), &output.document)?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Nb2DocxError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Nb2DocxError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

/// Handle a JSON conversion request.
///
/// `lab_info`, when present, is layered over `base` (title and the slots it
/// names).
pub fn convert_request(
    request: ConvertRequest,
    base: &ConversionConfig,
) -> Result<ConvertResponse, Nb2DocxError> {
    if request.notebook_content.is_empty() {
        return Err(Nb2DocxError::EmptyNotebook);
    }
    let config = match request.lab_info {
        Some(settings) => base.with_settings(settings)?,
        None => base.clone(),
    };
    let output = convert_notebook(&request.notebook_content, &request.filename, &config)?;
    Ok(ConvertResponse::from(&output))
}

/// Summarise a notebook file or URL without rendering it.
///
/// Only `config.download_timeout_secs` is consulted.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<NotebookSummary, Nb2DocxError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    input::validate_filename(&resolved.filename)?;
    let notebook = parse_notebook(&resolved.content)?;
    Ok(NotebookSummary::from_notebook(resolved.filename, &notebook))
}

/// Output filename for a notebook: a trailing `.ipynb` becomes `.docx`;
/// any other name gets `.docx` appended.
pub fn docx_filename(name: &str) -> String {
    let stem = name.strip_suffix(NOTEBOOK_EXTENSION).unwrap_or(name);
    format!("{stem}.docx")
}

/// Write package bytes to `path` atomically: a temporary file in the
/// destination directory is persisted into place.
pub fn write_package(path: &Path, bytes: &[u8]) -> Result<(), Nb2DocxError> {
    let write_err = |e: std::io::Error| Nb2DocxError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
