//! Code-cell outputs: stream text, textual results and raster images.
//!
//! Dispatch is by output kind, then (for rich outputs) by the first MIME type
//! present in priority order `image/png`, `image/jpeg`, `image/svg+xml`,
//! `text/plain`. `error` outputs and unknown kinds render nothing.
//!
//! Image problems never abort a conversion: a payload that fails base64 or
//! image decoding becomes a centered italic placeholder and a
//! [`RenderWarning`] is recorded.

use crate::document::{Alignment, Block, ImageFormat, ImageRun, Inline, Paragraph, TextRun};
use crate::error::RenderWarning;
use crate::notebook::{Output, RichContent};
use crate::style;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static RE_ARRAY_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^array\(\[(.*?)\](?:,\s*dtype=.*?)?\)$").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const SVG_PLACEHOLDER: &str =
    "[Image: SVG plot/figure - SVG format not supported in Word documents]";

/// Display size for embedded images, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: style::DEFAULT_IMAGE_WIDTH,
            height: style::DEFAULT_IMAGE_HEIGHT,
        }
    }
}

/// Blocks produced for one cell's outputs plus what happened along the way.
#[derive(Debug, Default)]
pub struct RenderedOutputs {
    pub blocks: Vec<Block>,
    pub rendered: usize,
    pub images_embedded: usize,
    pub image_fallbacks: usize,
    pub warnings: Vec<RenderWarning>,
}

/// Render every output of the code cell at index `cell` (0-based, used only
/// for warnings).
pub fn render_outputs(outputs: &[Output], cell: usize, image_size: ImageSize) -> RenderedOutputs {
    let mut result = RenderedOutputs::default();

    for output in outputs {
        let before = result.blocks.len();
        match output {
            Output::Stream { text } => {
                if !text.is_empty() {
                    result.blocks.extend(monospace_lines(text.trim(), false));
                }
            }
            Output::ExecuteResult(bundle) | Output::DisplayData(bundle) => {
                match bundle.preferred() {
                    Some(RichContent::Png(b64)) => {
                        render_image(&b64, ImageFormat::Png, cell, image_size, &mut result)
                    }
                    Some(RichContent::Jpeg(b64)) => {
                        render_image(&b64, ImageFormat::Jpeg, cell, image_size, &mut result)
                    }
                    Some(RichContent::Svg) => {
                        result.blocks.push(placeholder(SVG_PLACEHOLDER));
                        result.warnings.push(RenderWarning::SvgUnsupported { cell });
                    }
                    Some(RichContent::Text(text)) => {
                        let cleaned = clean_array_literal(text.trim());
                        result.blocks.extend(monospace_lines(&cleaned, true));
                    }
                    None => {}
                }
            }
            Output::Other { output_type } => {
                debug!("Cell {}: skipping '{}' output", cell, output_type);
            }
        }
        if result.blocks.len() > before {
            result.rendered += 1;
        }
    }

    result
}

/// Strip a NumPy `array([...])` wrapper (with optional `dtype=`) down to the
/// bracketed contents.
///
/// Contents spanning several lines keep their line breaks; single-line
/// contents have whitespace runs collapsed to one space. Anything that is
/// not an array literal is returned trimmed. Applying it twice is the same as
/// applying it once.
pub fn clean_array_literal(text: &str) -> String {
    let cleaned = text.trim();
    if !cleaned.starts_with("array(") {
        return cleaned.to_string();
    }
    match RE_ARRAY_LITERAL.captures(cleaned) {
        Some(caps) => {
            let content = &caps[1];
            if content.contains('\n') {
                format!("[{content}]")
            } else {
                format!("[{}]", RE_WHITESPACE.replace_all(content, " "))
            }
        }
        None => cleaned.to_string(),
    }
}

/// One Consolas paragraph per line; the first gets extra space before, the
/// last extra space after. Blank lines render as a single space.
fn monospace_lines(text: &str, trim_lines: bool) -> Vec<Block> {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line = if trim_lines { line.trim() } else { line };
            let line = if line.is_empty() { " " } else { line };
            Block::Paragraph(
                Paragraph::new()
                    .with_run(TextRun::code(line, style::COLOR_DEFAULT))
                    .spacing(
                        if i == 0 { 100 } else { 0 },
                        if i == last { 200 } else { 0 },
                    ),
            )
        })
        .collect()
}

fn render_image(
    b64: &str,
    format: ImageFormat,
    cell: usize,
    size: ImageSize,
    result: &mut RenderedOutputs,
) {
    match decode_image(b64, format) {
        Ok(bytes) => {
            debug!(
                "Cell {}: embedding {} image ({} bytes)",
                cell,
                format.label(),
                bytes.len()
            );
            result.blocks.push(Block::Paragraph(
                Paragraph::new()
                    .with_inline(Inline::Image(ImageRun {
                        bytes,
                        format,
                        width: size.width,
                        height: size.height,
                    }))
                    .align(Alignment::Center)
                    .spacing(200, 200),
            ));
            result.images_embedded += 1;
        }
        Err(detail) => {
            warn!(
                "Cell {}: failed to decode {} image: {}",
                cell,
                format.label(),
                detail
            );
            result.blocks.push(placeholder(&format!(
                "[Image: {} plot/figure]",
                format.label()
            )));
            result.image_fallbacks += 1;
            result.warnings.push(RenderWarning::ImageDecodeFailed {
                cell,
                kind: format.label().to_string(),
                detail,
            });
        }
    }
}

/// Base64-decode a payload and confirm the bytes are a readable image of the
/// declared format.
fn decode_image(b64: &str, format: ImageFormat) -> Result<Vec<u8>, String> {
    let compact: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| e.to_string())?;
    let image_format = match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
    };
    image::load_from_memory_with_format(&bytes, image_format).map_err(|e| e.to_string())?;
    Ok(bytes)
}

fn placeholder(text: &str) -> Block {
    Block::Paragraph(
        Paragraph::new()
            .with_run(
                TextRun::text(text, style::SIZE_PLACEHOLDER)
                    .italic()
                    .color(style::COLOR_MUTED),
            )
            .align(Alignment::Center)
            .spacing(100, 100),
    )
}
