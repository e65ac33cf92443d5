//! # nb2docx
//!
//! Convert Jupyter notebooks (`.ipynb`) to Word documents (`.docx`).
//!
//! Markdown cells become styled paragraphs, code cells become shaded
//! `In [n]:` blocks with lightweight tinting, and captured outputs (stream
//! text, textual results, PNG/JPEG figures) follow their cell. Every page
//! carries a three-slot header and footer configured per conversion: custom
//! text, live page numbers, date/time, filename or title.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .ipynb
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Parse     notebook JSON → cells + outputs
//!  ├─ 3. Assemble  title, cells in order, header/footer tables
//!  └─ 4. Package   document tree → .docx bytes + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nb2docx::{convert_to_file, ConversionConfig, Preset};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .title("Lab 2: Linear Models")
//!         .preset(Preset::Academic)
//!         .build()?;
//!     let stats = convert_to_file("lab2.ipynb", "lab2.docx", &config).await?;
//!     eprintln!("{} cells, {} images", stats.total_cells, stats.images_embedded);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `nb2docx` binary (clap + anyhow + indicatif + tracing-subscriber) |
//! | `server` | off     | Enables [`server`] and the `nb2docx-server` binary (axum + tower-http) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod counter;
pub mod document;
pub mod error;
pub mod notebook;
pub mod output;
pub mod pipeline;
pub mod progress;
#[cfg(feature = "server")]
pub mod server;
pub mod style;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, DocumentSettings};
pub use convert::{
    convert, convert_notebook, convert_request, convert_sync, convert_to_file, docx_filename,
    inspect, write_package,
};
pub use counter::{CounterError, InMemoryCounter, UsageCounter};
pub use error::{Nb2DocxError, RenderWarning};
pub use notebook::{parse_notebook, Cell, Notebook, Output};
pub use output::{ConversionOutput, ConversionStats, ConvertRequest, ConvertResponse, NotebookSummary};
pub use pipeline::fields::{Field, HeaderFooterConfig, PageFormat, Preset};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
