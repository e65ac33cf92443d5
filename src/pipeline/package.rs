//! Package writer: document tree → `.docx` bytes via `docx-rs`.
//!
//! This is the only module that knows WordprocessingML. Two details are
//! handled here rather than in the tree:
//!
//! * Word merges directly adjacent tables into one, so every body table is
//!   followed by a small spacer paragraph.
//! * Image display sizes are given in pixels and converted to EMUs.

use crate::document::{
    Alignment, Block, Borders, DocumentTree, Inline, PageField, PageFieldKind, Paragraph, Table,
    TextRun,
};
use crate::error::Nb2DocxError;
use docx_rs::{
    AlignmentType, BorderType, Docx, FieldCharType, Footer, Header, InstrNUMPAGES, InstrPAGE,
    InstrText, LineSpacing, PageMargin, Pic, Run, RunFonts, Shading, TableBorder,
    TableBorderPosition, TableBorders, TableCell, TableRow, WidthType,
};
use std::io::Cursor;

/// EMUs per pixel at 96 DPI.
const EMU_PER_PX: u32 = 9525;

/// `WidthType::Pct` is expressed in fiftieths of a percent.
const PCT_UNIT: f32 = 50.0;

const SPACER_AFTER_TABLE: u32 = 100;

/// Serialize a document tree to `.docx` bytes.
///
/// # Errors
/// [`Nb2DocxError::PackageFailed`] when the package writer fails.
pub fn to_docx(tree: &DocumentTree) -> Result<Vec<u8>, Nb2DocxError> {
    let margin = tree.margin_twips as i32;
    let mut docx = Docx::new().page_margin(
        PageMargin::new()
            .top(margin)
            .bottom(margin)
            .left(margin)
            .right(margin),
    );

    for block in &tree.body {
        match block {
            Block::Paragraph(p) => docx = docx.add_paragraph(paragraph(p)),
            Block::Table(t) => {
                docx = docx.add_table(table(t)).add_paragraph(
                    docx_rs::Paragraph::new()
                        .line_spacing(LineSpacing::new().after(SPACER_AFTER_TABLE)),
                );
            }
        }
    }

    let header = tree.header.iter().fold(Header::new(), |h, block| match block {
        Block::Paragraph(p) => h.add_paragraph(paragraph(p)),
        Block::Table(t) => h.add_table(table(t)),
    });
    let footer = tree.footer.iter().fold(Footer::new(), |f, block| match block {
        Block::Paragraph(p) => f.add_paragraph(paragraph(p)),
        Block::Table(t) => f.add_table(table(t)),
    });
    docx = docx.header(header).footer(footer);

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| Nb2DocxError::PackageFailed(e.to_string()))?;
    Ok(buf.into_inner())
}

fn paragraph(p: &Paragraph) -> docx_rs::Paragraph {
    let mut out = docx_rs::Paragraph::new()
        .align(alignment(p.alignment))
        .line_spacing(
            LineSpacing::new()
                .before(p.spacing.before)
                .after(p.spacing.after),
        );
    if let Some(left) = p.indent_left {
        out = out.indent(Some(left), None, None, None);
    }
    p.inlines.iter().fold(out, |out, inline| {
        out.add_run(match inline {
            Inline::Text(run) => text_run(run),
            Inline::Image(img) => Run::new().add_image(
                Pic::new(&img.bytes).size(img.width * EMU_PER_PX, img.height * EMU_PER_PX),
            ),
            Inline::Field(field) => page_field(field),
        })
    })
}

fn text_run(run: &TextRun) -> Run {
    let mut out = Run::new()
        .add_text(&run.text)
        .size(run.size)
        .fonts(RunFonts::new().ascii(run.font).hi_ansi(run.font));
    if run.bold {
        out = out.bold();
    }
    if run.italic {
        out = out.italic();
    }
    if let Some(color) = run.color {
        out = out.color(color);
    }
    out
}

/// A complex field run; the cached result is replaced by Word on layout.
fn page_field(field: &PageField) -> Run {
    let (instr, cached) = match field.kind {
        PageFieldKind::CurrentPage => (InstrText::PAGE(InstrPAGE::new()), "1"),
        PageFieldKind::TotalPages => (InstrText::NUMPAGES(InstrNUMPAGES::new()), "1"),
        PageFieldKind::CurrentPageRoman => {
            (InstrText::Unsupported("PAGE \\* roman".to_string()), "i")
        }
    };
    Run::new()
        .size(field.size)
        .add_field_char(FieldCharType::Begin, false)
        .add_instr_text(instr)
        .add_field_char(FieldCharType::Separate, false)
        .add_text(cached)
        .add_field_char(FieldCharType::End, false)
}

fn table(t: &Table) -> docx_rs::Table {
    let rows = t
        .rows
        .iter()
        .map(|row| {
            TableRow::new(
                row.iter()
                    .map(|cell| {
                        let mut out = cell
                            .paragraphs
                            .iter()
                            .fold(TableCell::new(), |c, p| c.add_paragraph(paragraph(p)));
                        if let Some(fill) = cell.shading {
                            out = out.shading(Shading::new().fill(fill));
                        }
                        if let Some(pct) = cell.width_pct {
                            out = out.width((pct * PCT_UNIT).round() as usize, WidthType::Pct);
                        }
                        out
                    })
                    .collect(),
            )
        })
        .collect();

    docx_rs::Table::new(rows)
        .width((100.0 * PCT_UNIT) as usize, WidthType::Pct)
        .set_borders(borders(t.borders))
}

fn borders(b: Borders) -> TableBorders {
    match b {
        Borders::None => TableBorders::with_empty(),
        Borders::Single { size, color } => [
            TableBorderPosition::Top,
            TableBorderPosition::Bottom,
            TableBorderPosition::Left,
            TableBorderPosition::Right,
            TableBorderPosition::InsideH,
            TableBorderPosition::InsideV,
        ]
        .into_iter()
        .fold(TableBorders::with_empty(), |acc, position| {
            acc.set(
                TableBorder::new(position)
                    .border_type(BorderType::Single)
                    .size(size)
                    .color(color),
            )
        }),
    }
}

fn alignment(a: Alignment) -> AlignmentType {
    match a {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
    }
}
