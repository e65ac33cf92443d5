//! Result types returned by the conversion entry points.

use crate::config::DocumentSettings;
use crate::error::RenderWarning;
use crate::notebook::{Cell, Notebook, Output, RichContent};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// MIME type of a `.docx` package.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A finished conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The `.docx` package bytes.
    pub document: Vec<u8>,
    /// Suggested output filename (`lab.ipynb` → `lab.docx`).
    pub filename: String,
    /// Title the document was rendered with.
    pub title: String,
    pub stats: ConversionStats,
    /// Outputs that were replaced by placeholders.
    pub warnings: Vec<RenderWarning>,
}

/// Counters collected while rendering one notebook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_cells: usize,
    pub markdown_cells: usize,
    pub code_cells: usize,
    /// Raw and unknown cells plus code cells with a blank source.
    pub skipped_cells: usize,
    pub outputs_rendered: usize,
    pub images_embedded: usize,
    pub image_fallbacks: usize,
    /// Top-level blocks in the document body, title included.
    pub body_blocks: usize,
    pub package_bytes: usize,
    pub duration_ms: u64,
}

/// What a notebook contains, without rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookSummary {
    pub filename: String,
    pub total_cells: usize,
    pub markdown_cells: usize,
    pub code_cells: usize,
    pub other_cells: usize,
    /// Code cells whose source is blank; these render nothing.
    pub empty_code_cells: usize,
    pub outputs: usize,
    /// PNG/JPEG/SVG outputs.
    pub image_outputs: usize,
    pub kernel_name: Option<String>,
    pub language: Option<String>,
    pub nbformat: Option<u64>,
}

impl NotebookSummary {
    pub fn from_notebook(filename: impl Into<String>, notebook: &Notebook) -> Self {
        let mut summary = Self {
            filename: filename.into(),
            total_cells: notebook.cells.len(),
            markdown_cells: 0,
            code_cells: 0,
            other_cells: 0,
            empty_code_cells: 0,
            outputs: 0,
            image_outputs: 0,
            kernel_name: notebook.metadata.kernel_name.clone(),
            language: notebook.metadata.language.clone(),
            nbformat: notebook.metadata.nbformat,
        };

        for cell in &notebook.cells {
            match cell {
                Cell::Markdown { .. } => summary.markdown_cells += 1,
                Cell::Code { source, outputs } => {
                    summary.code_cells += 1;
                    if source.trim().is_empty() {
                        summary.empty_code_cells += 1;
                    }
                    summary.outputs += outputs.len();
                    summary.image_outputs += outputs.iter().filter(|o| is_image(o)).count();
                }
                Cell::Other { .. } => summary.other_cells += 1,
            }
        }
        summary
    }
}

fn is_image(output: &Output) -> bool {
    match output {
        Output::ExecuteResult(bundle) | Output::DisplayData(bundle) => matches!(
            bundle.preferred(),
            Some(RichContent::Png(_) | RichContent::Jpeg(_) | RichContent::Svg)
        ),
        _ => false,
    }
}

// ── JSON conversion surface ──────────────────────────────────────────────

/// A JSON conversion request: the notebook text, its filename and optional
/// header/footer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub notebook_content: String,
    pub filename: String,
    #[serde(default)]
    pub lab_info: Option<DocumentSettings>,
}

/// The JSON response: base64 package plus the output filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub document: String,
    pub filename: String,
}

impl From<&ConversionOutput> for ConvertResponse {
    fn from(output: &ConversionOutput) -> Self {
        Self {
            document: STANDARD.encode(&output.document),
            filename: output.filename.clone(),
        }
    }
}
