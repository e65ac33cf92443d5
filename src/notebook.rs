//! Jupyter notebook data model and parsing.
//!
//! Only the parts of nbformat that affect the rendered document are modelled:
//! the ordered cell list, each cell's kind and source, and each code cell's
//! captured outputs. Everything else (cell metadata, attachments, widget
//! state) is ignored.
//!
//! Parsing is lenient about *values* and strict about *shape*: a `source`
//! may be a string, a list of line fragments, or anything else (which
//! degrades to its JSON text), and `null` reads as absent. The top-level
//! object must carry a `cells` array ([`Nb2DocxError::InvalidNotebook`]) and
//! every cell must be a JSON object ([`Nb2DocxError::MalformedCell`]).

use crate::error::Nb2DocxError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A parsed notebook: ordered cells plus the metadata used for inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    pub metadata: NotebookMetadata,
}

/// Notebook-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotebookMetadata {
    /// Kernel name (e.g. "python3").
    pub kernel_name: Option<String>,
    /// Programming language name (e.g. "python").
    pub language: Option<String>,
    /// Major nbformat version.
    pub nbformat: Option<u64>,
}

/// One unit of a notebook.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Markdown {
        source: String,
    },
    Code {
        source: String,
        outputs: Vec<Output>,
    },
    /// Raw cells and unknown kinds; contribute nothing to the document.
    Other {
        cell_type: String,
    },
}

impl Cell {
    /// The cell kind as written in the notebook.
    pub fn kind(&self) -> &str {
        match self {
            Cell::Markdown { .. } => "markdown",
            Cell::Code { .. } => "code",
            Cell::Other { cell_type } => cell_type,
        }
    }
}

/// One captured result of executing a code cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// stdout/stderr text.
    Stream { text: String },
    /// The value of the last expression.
    ExecuteResult(MimeBundle),
    /// Rich media produced by `display()`.
    DisplayData(MimeBundle),
    /// `error` and any unknown output type; not rendered.
    Other { output_type: String },
}

/// MIME type → payload mapping carried by rich outputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MimeBundle(pub Map<String, Value>);

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_SVG: &str = "image/svg+xml";
pub const MIME_TEXT: &str = "text/plain";

/// The single representation of a rich output that gets rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichContent {
    Png(String),
    Jpeg(String),
    Svg,
    Text(String),
}

impl MimeBundle {
    /// Pick the representation to render, in priority order
    /// `image/png`, `image/jpeg`, `image/svg+xml`, `text/plain`.
    ///
    /// Images take precedence over text representations of the same result.
    /// Empty payloads count as absent.
    pub fn preferred(&self) -> Option<RichContent> {
        let payload = |mime: &str| {
            self.0
                .get(mime)
                .map(normalize_source)
                .filter(|s| !s.is_empty())
        };

        if let Some(b64) = payload(MIME_PNG) {
            return Some(RichContent::Png(b64));
        }
        if let Some(b64) = payload(MIME_JPEG) {
            return Some(RichContent::Jpeg(b64));
        }
        if payload(MIME_SVG).is_some() {
            return Some(RichContent::Svg);
        }
        payload(MIME_TEXT).map(RichContent::Text)
    }
}

/// Turn a cell's raw `source` (or an output's `text`) into one string.
///
/// A list of fragments is concatenated in order with no separator; a string
/// is returned unchanged; `null` becomes empty; anything else degrades to its
/// JSON text rather than failing.
pub fn normalize_source(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(|p| match p {
                Value::String(s) => s.clone(),
                other => normalize_source(other),
            })
            .collect(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawNotebook {
    cells: Vec<Value>,
    #[serde(default)]
    metadata: Value,
    #[serde(default)]
    nbformat: Option<u64>,
}

// `null` and a missing key mean the same thing in the fields below.

#[derive(Deserialize)]
struct RawCell {
    #[serde(default)]
    cell_type: Option<String>,
    #[serde(default)]
    source: Value,
    #[serde(default)]
    outputs: Option<Vec<RawOutput>>,
}

#[derive(Deserialize)]
struct RawOutput {
    #[serde(default)]
    output_type: Option<String>,
    #[serde(default)]
    text: Value,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

impl From<RawOutput> for Output {
    fn from(raw: RawOutput) -> Self {
        let output_type = raw.output_type.unwrap_or_default();
        match output_type.as_str() {
            "stream" => Output::Stream {
                text: normalize_source(&raw.text),
            },
            "execute_result" => Output::ExecuteResult(MimeBundle(raw.data.unwrap_or_default())),
            "display_data" => Output::DisplayData(MimeBundle(raw.data.unwrap_or_default())),
            _ => Output::Other { output_type },
        }
    }
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        let cell_type = raw.cell_type.unwrap_or_default();
        match cell_type.as_str() {
            "markdown" => Cell::Markdown {
                source: normalize_source(&raw.source),
            },
            "code" => Cell::Code {
                source: normalize_source(&raw.source),
                outputs: raw
                    .outputs
                    .unwrap_or_default()
                    .into_iter()
                    .map(Output::from)
                    .collect(),
            },
            _ => Cell::Other { cell_type },
        }
    }
}

/// Parse notebook JSON text.
///
/// # Errors
/// * [`Nb2DocxError::InvalidNotebook`] when the text is not JSON or the
///   top-level object has no `cells` array
/// * [`Nb2DocxError::MalformedCell`] when a cell or one of its outputs has an
///   unexpected shape (not an object, a field of the wrong type)
pub fn parse_notebook(content: &str) -> Result<Notebook, Nb2DocxError> {
    let raw: RawNotebook = serde_json::from_str(content)?;

    let str_at = |pointer: &str| {
        raw.metadata
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let metadata = NotebookMetadata {
        kernel_name: str_at("/kernelspec/name"),
        language: str_at("/language_info/name").or_else(|| str_at("/kernelspec/language")),
        nbformat: raw.nbformat,
    };

    let cells = raw
        .cells
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<RawCell>(value)
                .map(Cell::from)
                .map_err(|e| Nb2DocxError::MalformedCell {
                    index: index + 1,
                    detail: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Notebook { cells, metadata })
}
