//! Markdown cells: one styled paragraph per source line.
//!
//! This is line-prefix classification, not a markdown parser. Each line is
//! trimmed and matched against the rules below in order; the first match
//! wins. Markdown cells never produce tables or images.
//!
//! | Prefix            | Rendering                        |
//! |-------------------|----------------------------------|
//! | (empty)           | spacing-only paragraph           |
//! | `### `            | bold, 14 pt                      |
//! | `## `             | bold, 16 pt                      |
//! | `# `              | bold, 18 pt                      |
//! | `- `              | bullet glyph, indented, 11 pt    |
//! | `1. ` (digits)    | bold, 15 pt                      |
//! | anything else     | body, 11 pt                      |

use crate::document::{Block, Paragraph, TextRun};
use crate::style;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s").unwrap());

/// Classification of a single trimmed markdown line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Heading { level: u8, text: &'a str },
    Bullet(&'a str),
    OrderedItem(&'a str),
    Body(&'a str),
}

/// Classify one line. Longer heading prefixes are tested first, so
/// `"### ## x"` is a level-3 heading with text `"## x"`.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();

    if line.is_empty() {
        LineKind::Blank
    } else if let Some(rest) = line.strip_prefix("### ") {
        LineKind::Heading {
            level: 3,
            text: rest.trim(),
        }
    } else if let Some(rest) = line.strip_prefix("## ") {
        LineKind::Heading {
            level: 2,
            text: rest.trim(),
        }
    } else if let Some(rest) = line.strip_prefix("# ") {
        LineKind::Heading {
            level: 1,
            text: rest.trim(),
        }
    } else if let Some(rest) = line.strip_prefix("- ") {
        LineKind::Bullet(rest.trim())
    } else if RE_ORDERED_ITEM.is_match(line) {
        LineKind::OrderedItem(line)
    } else {
        LineKind::Body(line)
    }
}

/// Render a markdown cell's normalized source.
///
/// An empty source produces no blocks; otherwise exactly one paragraph is
/// produced per `\n`-separated line.
pub fn render_markdown(source: &str) -> Vec<Block> {
    if source.is_empty() {
        return Vec::new();
    }
    source
        .split('\n')
        .map(|line| Block::Paragraph(render_line(classify_line(line))))
        .collect()
}

fn render_line(kind: LineKind<'_>) -> Paragraph {
    match kind {
        LineKind::Blank => Paragraph::blank(120),
        LineKind::Heading { level, text } => {
            let (size, before, after) = match level {
                1 => (style::SIZE_H1, 300, 200),
                2 => (style::SIZE_H2, 250, 200),
                _ => (style::SIZE_H3, 200, 150),
            };
            Paragraph::new()
                .with_run(TextRun::text(text, size).bold())
                .spacing(before, after)
        }
        LineKind::Bullet(text) => Paragraph::new()
            .with_run(TextRun::text(
                format!("{} {}", style::BULLET_GLYPH, text),
                style::SIZE_BODY,
            ))
            .indent(style::BULLET_INDENT_TWIPS)
            .spacing(120, 120),
        LineKind::OrderedItem(text) => Paragraph::new()
            .with_run(TextRun::text(text, style::SIZE_ORDERED).bold())
            .spacing(300, 200),
        LineKind::Body(text) => Paragraph::new()
            .with_run(TextRun::text(text, style::SIZE_BODY))
            .spacing(100, 100),
    }
}
