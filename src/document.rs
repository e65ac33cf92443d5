//! Abstract document tree produced by the renderers.
//!
//! The tree is independent of the package format: renderers build it, tests
//! inspect it, and [`crate::pipeline::package`] is the only place that knows
//! how to turn it into WordprocessingML.

use crate::style;

/// A complete document: body blocks, running header/footer, page geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    pub body: Vec<Block>,
    pub header: Vec<Block>,
    pub footer: Vec<Block>,
    /// Uniform page margin in twips.
    pub margin_twips: u32,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        }
    }

    /// Concatenated text of every text run in the block, paragraphs of a
    /// table joined with `\n`.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::Table(t) => t
                .rows
                .iter()
                .flat_map(|row| row.iter())
                .flat_map(|cell| cell.paragraphs.iter())
                .map(Paragraph::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Space before/after a paragraph, in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spacing {
    pub before: u32,
    pub after: u32,
}

impl Spacing {
    pub const fn new(before: u32, after: u32) -> Self {
        Self { before, after }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
    pub alignment: Alignment,
    pub spacing: Spacing,
    /// Left indent in twips.
    pub indent_left: Option<i32>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph with spacing only and no runs.
    pub fn blank(after: u32) -> Self {
        Self {
            spacing: Spacing::new(0, after),
            ..Self::default()
        }
    }

    pub fn with_run(mut self, run: TextRun) -> Self {
        self.inlines.push(Inline::Text(run));
        self
    }

    pub fn with_inline(mut self, inline: Inline) -> Self {
        self.inlines.push(inline);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn spacing(mut self, before: u32, after: u32) -> Self {
        self.spacing = Spacing::new(before, after);
        self
    }

    pub fn indent(mut self, left: i32) -> Self {
        self.indent_left = Some(left);
        self
    }

    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.inlines.iter().filter_map(|i| match i {
            Inline::Text(r) => Some(r),
            _ => None,
        })
    }

    pub fn plain_text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.inlines.is_empty()
    }
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(TextRun),
    Image(ImageRun),
    /// A live page-number token resolved by the word processor at render time.
    Field(PageField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub font: &'static str,
    /// Half-points.
    pub size: usize,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<&'static str>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, font: &'static str, size: usize) -> Self {
        Self {
            text: text.into(),
            font,
            size,
            bold: false,
            italic: false,
            color: None,
        }
    }

    /// Calibri run.
    pub fn text(text: impl Into<String>, size: usize) -> Self {
        Self::new(text, style::FONT_TEXT, size)
    }

    /// Consolas run.
    pub fn code(text: impl Into<String>, color: &'static str) -> Self {
        Self::new(text, style::FONT_CODE, style::SIZE_CODE).color(color)
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn label(self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        }
    }
}

/// An embedded raster image with its display size in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRun {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFieldKind {
    CurrentPage,
    TotalPages,
    /// Current page rendered as a lower-case roman numeral.
    CurrentPageRoman,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageField {
    pub kind: PageFieldKind,
    pub size: usize,
}

impl PageField {
    pub fn new(kind: PageFieldKind) -> Self {
        Self {
            kind,
            size: style::SIZE_PAGE_NUMBER,
        }
    }
}

/// Table border style applied to every edge and inside line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Borders {
    None,
    Single { size: usize, color: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<TableCell>>,
    pub borders: Borders,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    pub shading: Option<&'static str>,
    /// Width as a percentage of the table width.
    pub width_pct: Option<f32>,
}
