//! Visual constants shared by the renderers.
//!
//! Sizes are in half-points (the unit Word uses for `w:sz`), spacing in
//! twentieths of a point (twips), colours as `RRGGBB` hex.

pub const FONT_TEXT: &str = "Calibri";
pub const FONT_CODE: &str = "Consolas";

// ── Sizes ────────────────────────────────────────────────────────────────

pub const SIZE_TITLE: usize = 28;
pub const SIZE_H1: usize = 36;
pub const SIZE_H2: usize = 32;
pub const SIZE_H3: usize = 28;
pub const SIZE_ORDERED: usize = 30;
pub const SIZE_BODY: usize = 22;
pub const SIZE_CODE: usize = 20;
pub const SIZE_PLACEHOLDER: usize = 20;
pub const SIZE_FIELD_TEXT: usize = 22;
pub const SIZE_PAGE_NUMBER: usize = 20;

// ── Colours ──────────────────────────────────────────────────────────────

pub const COLOR_DEFAULT: &str = "000000";
pub const COLOR_MUTED: &str = "666666";
pub const COLOR_COMMENT: &str = "008000";
pub const COLOR_CALL: &str = "800080";
pub const COLOR_KEYWORD: &str = "0000FF";
pub const COLOR_CODE_BORDER: &str = "CCCCCC";
pub const COLOR_CODE_SHADING: &str = "FAFAFA";

// ── Layout ───────────────────────────────────────────────────────────────

/// 1 inch.
pub const DEFAULT_MARGIN_TWIPS: u32 = 1440;
pub const BULLET_INDENT_TWIPS: i32 = 360;
pub const BULLET_GLYPH: char = '\u{2022}';

pub const DEFAULT_IMAGE_WIDTH: u32 = 400;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 300;

pub const DEFAULT_TITLE: &str = "Jupyter to word converter";
