//! Pipeline stages for notebook-to-document conversion.
//!
//! Each submodule implements one transformation step and is tested on its
//! own; only [`package`] knows the output format.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ parse ──▶ assemble ──────────────────────▶ package
//! (URL/path) (JSON)    ├─ markdown  (per line)          (docx-rs)
//!                      ├─ code      (In [n]: + tint)
//!                      ├─ outputs   (text, images)
//!                      └─ fields    (header/footer)
//! ```
//!
//! 1. [`input`]    — read a local file or download a URL; filename checks
//! 2. [`assemble`] — walk cells in order and build the document tree
//! 3. [`markdown`], [`code`], [`outputs`] — per-cell renderers
//! 4. [`fields`]   — header/footer slot model and resolution
//! 5. [`package`]  — serialise the tree to `.docx` bytes

pub mod assemble;
pub mod code;
pub mod fields;
pub mod input;
pub mod markdown;
pub mod outputs;
pub mod package;
