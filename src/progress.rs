//! Progress-callback trait for per-cell conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the assembler walks the notebook.
//!
//! # Example
//!
//! ```rust
//! use nb2docx::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     blocks: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_cell_complete(&self, cell_num: usize, total_cells: usize, blocks: usize) {
//!         self.blocks.fetch_add(blocks, Ordering::SeqCst);
//!         eprintln!("Cell {}/{} done ({} blocks)", cell_num, total_cells, blocks);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { blocks: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the assembler as it renders each cell.
///
/// Cells are rendered strictly in order on one thread, but the callback may
/// be shared with other conversions, hence `Send + Sync`. All methods default
/// to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first cell.
    fn on_conversion_start(&self, total_cells: usize) {
        let _ = total_cells;
    }

    /// Called before a cell is rendered.
    ///
    /// # Arguments
    /// * `cell_num`    — 1-indexed cell number
    /// * `total_cells` — cells in the notebook
    /// * `kind`        — `"markdown"`, `"code"` or the raw cell type
    fn on_cell_start(&self, cell_num: usize, total_cells: usize, kind: &str) {
        let _ = (cell_num, total_cells, kind);
    }

    /// Called after a cell is rendered. `blocks` is the number of body blocks
    /// it produced (zero for skipped or empty cells).
    fn on_cell_complete(&self, cell_num: usize, total_cells: usize, blocks: usize) {
        let _ = (cell_num, total_cells, blocks);
    }

    /// Called once after the last cell, before packaging.
    ///
    /// # Arguments
    /// * `total_cells`    — cells in the notebook
    /// * `rendered_cells` — cells that produced at least one block
    fn on_conversion_complete(&self, total_cells: usize, rendered_cells: usize) {
        let _ = (total_cells, rendered_cells);
    }
}

/// No-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
