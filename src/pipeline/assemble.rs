//! Document assembly: title, cells in order, running header and footer.
//!
//! Cells are rendered strictly in sequence because the execution counter is
//! shared across them. The header and footer are each a borderless one-row,
//! three-column table whose cells are left-, center- and right-aligned.

use crate::document::{Alignment, Block, Borders, DocumentTree, Paragraph, Table, TableCell, TextRun};
use crate::error::RenderWarning;
use crate::notebook::{Cell, Notebook};
use crate::output::ConversionStats;
use crate::pipeline::code::{self, ExecutionCounter};
use crate::pipeline::fields::{self, Field, FieldContext, HeaderFooterConfig};
use crate::pipeline::markdown;
use crate::pipeline::outputs::{self, ImageSize};
use crate::progress::ConversionProgressCallback;
use crate::style;
use chrono::NaiveDateTime;
use tracing::debug;

/// Everything the assembler needs besides the notebook itself.
pub struct RenderContext<'a> {
    pub title: &'a str,
    /// Source notebook filename, for `filename` fields.
    pub filename: &'a str,
    pub header_footer: &'a HeaderFooterConfig,
    pub image_size: ImageSize,
    pub margin_twips: u32,
    /// Captured once; every date/time field shows this instant.
    pub now: NaiveDateTime,
    pub progress: Option<&'a dyn ConversionProgressCallback>,
}

/// The assembled tree plus what was observed while building it.
#[derive(Debug)]
pub struct RenderedDocument {
    pub tree: DocumentTree,
    pub stats: ConversionStats,
    pub warnings: Vec<RenderWarning>,
    /// Counter value after the last code cell (1 + rendered code cells).
    pub next_execution_count: u32,
}

/// Build the document tree for a parsed notebook.
pub fn render_notebook(notebook: &Notebook, ctx: &RenderContext<'_>) -> RenderedDocument {
    let total = notebook.cells.len();
    let mut counter = ExecutionCounter::new();
    let mut stats = ConversionStats {
        total_cells: total,
        ..ConversionStats::default()
    };
    let mut warnings = Vec::new();
    let mut rendered_cells = 0;

    if let Some(cb) = ctx.progress {
        cb.on_conversion_start(total);
    }

    let mut body = vec![title_block(ctx.title)];

    for (idx, cell) in notebook.cells.iter().enumerate() {
        if let Some(cb) = ctx.progress {
            cb.on_cell_start(idx + 1, total, cell.kind());
        }
        let before = body.len();

        match cell {
            Cell::Markdown { source } => {
                stats.markdown_cells += 1;
                body.extend(markdown::render_markdown(source));
            }
            Cell::Code { source, outputs } => {
                stats.code_cells += 1;
                match code::render_code(source, &mut counter) {
                    Some(block) => {
                        body.push(block);
                        let rendered = outputs::render_outputs(outputs, idx, ctx.image_size);
                        stats.outputs_rendered += rendered.rendered;
                        stats.images_embedded += rendered.images_embedded;
                        stats.image_fallbacks += rendered.image_fallbacks;
                        warnings.extend(rendered.warnings);
                        body.extend(rendered.blocks);
                    }
                    None => {
                        debug!("Cell {}: blank code cell skipped", idx + 1);
                        stats.skipped_cells += 1;
                    }
                }
            }
            Cell::Other { cell_type } => {
                debug!("Cell {}: skipping '{}' cell", idx + 1, cell_type);
                stats.skipped_cells += 1;
            }
        }

        let produced = body.len() - before;
        if produced > 0 {
            rendered_cells += 1;
        }
        debug!("Cell {}/{}: {} blocks", idx + 1, total, produced);
        if let Some(cb) = ctx.progress {
            cb.on_cell_complete(idx + 1, total, produced);
        }
    }

    if let Some(cb) = ctx.progress {
        cb.on_conversion_complete(total, rendered_cells);
    }

    stats.body_blocks = body.len();

    let field_ctx = FieldContext {
        filename: ctx.filename,
        title: ctx.title,
        now: ctx.now,
    };
    let tree = DocumentTree {
        body,
        header: vec![slot_table(ctx.header_footer.header(), &field_ctx)],
        footer: vec![slot_table(ctx.header_footer.footer(), &field_ctx)],
        margin_twips: ctx.margin_twips,
    };

    RenderedDocument {
        tree,
        stats,
        warnings,
        next_execution_count: counter.current(),
    }
}

fn title_block(title: &str) -> Block {
    Block::Paragraph(
        Paragraph::new()
            .with_run(TextRun::text(title, style::SIZE_TITLE).bold())
            .align(Alignment::Center)
            .spacing(400, 300),
    )
}

/// One borderless row with the three slots left/center/right.
fn slot_table(slots: [Option<&Field>; 3], ctx: &FieldContext<'_>) -> Block {
    const ALIGN: [Alignment; 3] = [Alignment::Left, Alignment::Center, Alignment::Right];

    let cells = slots
        .into_iter()
        .zip(ALIGN)
        .map(|(field, alignment)| TableCell {
            paragraphs: vec![fields::resolve_field(field, ctx)
                .into_iter()
                .fold(Paragraph::new().align(alignment), Paragraph::with_inline)],
            shading: None,
            width_pct: Some(100.0 / 3.0),
        })
        .collect();

    Block::Table(Table {
        rows: vec![cells],
        borders: Borders::None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, PageFieldKind};
    use crate::notebook::parse_notebook;
    use crate::pipeline::fields::PageFormat;
    use chrono::NaiveDate;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn render(nb: serde_json::Value, hf: &HeaderFooterConfig) -> RenderedDocument {
        let notebook = parse_notebook(&nb.to_string()).unwrap();
        render_notebook(
            &notebook,
            &RenderContext {
                title: "My Lab",
                filename: "lab1.ipynb",
                header_footer: hf,
                image_size: ImageSize::default(),
                margin_twips: style::DEFAULT_MARGIN_TWIPS,
                now: now(),
                progress: None,
            },
        )
    }

    #[test]
    fn empty_notebook_has_title_and_header_footer_only() {
        let doc = render(json!({"cells": []}), &HeaderFooterConfig::default());
        assert_eq!(doc.tree.body.len(), 1);
        let title = doc.tree.body[0].as_paragraph().unwrap();
        assert_eq!(title.plain_text(), "My Lab");
        assert_eq!(title.alignment, Alignment::Center);
        assert!(title.runs().all(|r| r.bold));

        let header = doc.tree.header[0].as_table().unwrap();
        assert_eq!(header.borders, Borders::None);
        assert_eq!(header.rows[0].len(), 3);
        assert_eq!(doc.tree.margin_twips, 1440);
        assert_eq!(doc.next_execution_count, 1);
    }

    #[test]
    fn cells_render_in_order_with_sequential_labels() {
        let doc = render(
            json!({"cells": [
                {"cell_type": "markdown", "source": ["# Intro\n", "Text"]},
                {"cell_type": "code", "source": "x = 1", "outputs": []},
                {"cell_type": "code", "source": "   ", "outputs": [
                    {"output_type": "stream", "text": "never shown"}
                ]},
                {"cell_type": "raw", "source": "ignored"},
                {"cell_type": "code", "source": "print(x)", "outputs": [
                    {"output_type": "stream", "name": "stdout", "text": ["1\n"]}
                ]}
            ]}),
            &HeaderFooterConfig::default(),
        );

        let texts: Vec<String> = doc.tree.body.iter().map(Block::plain_text).collect();
        assert_eq!(
            texts,
            vec![
                "My Lab".to_string(),
                "Intro".into(),
                "Text".into(),
                "In [1]: \nx = 1".into(),
                "In [2]: \nprint(x)".into(),
                "1".into(),
            ]
        );
        assert_eq!(doc.next_execution_count, 3);
        assert_eq!(doc.stats.code_cells, 3);
        assert_eq!(doc.stats.skipped_cells, 2);
        assert_eq!(doc.stats.outputs_rendered, 1);
        assert_eq!(doc.stats.body_blocks, 6);
        assert!(!texts.iter().any(|t| t.contains("never shown")));
    }

    #[test]
    fn heading_blank_body_then_tinted_code_and_stream() {
        let doc = render(
            json!({"cells": [
                {"cell_type": "markdown", "source": "# Title\n\nBody text"},
                {"cell_type": "code", "source": "print('hi')", "outputs": [
                    {"output_type": "stream", "name": "stdout", "text": "hi\n"}
                ]}
            ]}),
            &HeaderFooterConfig::default(),
        );

        let body = &doc.tree.body[1..];
        assert_eq!(body.len(), 5);
        assert_eq!(body[0].plain_text(), "Title");
        assert!(body[1].as_paragraph().unwrap().is_blank());
        assert_eq!(body[2].plain_text(), "Body text");

        let code = body[3].as_table().unwrap();
        let lines = &code.rows[0][0].paragraphs;
        assert_eq!(lines[0].plain_text(), "In [1]: ");
        let call = lines[1].runs().find(|r| r.text == "print").unwrap();
        assert_eq!(call.color, Some(style::COLOR_CALL));

        assert_eq!(body[4].plain_text(), "hi");
        assert_eq!(doc.next_execution_count, 2);
    }

    #[test]
    fn header_and_footer_slots_resolve_with_alignment() {
        let hf = HeaderFooterConfig {
            header_left: Some(Field::custom("CS 101")),
            header_right: Some(Field::Date),
            footer_center: Some(Field::page_number(PageFormat::Fraction)),
            footer_left: Some(Field::Filename),
            ..HeaderFooterConfig::default()
        };
        let doc = render(json!({"cells": []}), &hf);

        let header = &doc.tree.header[0].as_table().unwrap().rows[0];
        assert_eq!(header[0].paragraphs[0].plain_text(), "CS 101");
        assert_eq!(header[0].paragraphs[0].alignment, Alignment::Left);
        assert_eq!(header[1].paragraphs[0].plain_text(), "");
        assert_eq!(header[2].paragraphs[0].plain_text(), "1/2/2024");
        assert_eq!(header[2].paragraphs[0].alignment, Alignment::Right);

        let footer = &doc.tree.footer[0].as_table().unwrap().rows[0];
        assert_eq!(footer[0].paragraphs[0].plain_text(), "lab1");
        let center = &footer[1].paragraphs[0];
        assert_eq!(center.alignment, Alignment::Center);
        let kinds: Vec<_> = center
            .inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Field(f) => Some(f.kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![PageFieldKind::CurrentPage, PageFieldKind::TotalPages]);
    }
}
