//! End-to-end conversion tests.
//!
//! Notebooks are built in memory, converted, and the resulting package is
//! unzipped so the WordprocessingML parts can be checked for content.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use nb2docx::{
    convert, convert_notebook, convert_to_file, ConversionConfig, ConversionProgressCallback,
    DocumentSettings, Field, Nb2DocxError, PageFormat, Preset,
};
use serde_json::{json, Value};
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn notebook(cells: Vec<Value>) -> String {
    json!({
        "cells": cells,
        "metadata": {"kernelspec": {"name": "python3", "language": "python"}},
        "nbformat": 4,
        "nbformat_minor": 5
    })
    .to_string()
}

fn sample() -> String {
    notebook(vec![
        json!({"cell_type": "markdown", "source": ["# Results\n", "Some findings below.\n", "- first point"]}),
        json!({"cell_type": "code", "source": "import numpy as np\nprint(np.arange(3))", "outputs": [
            {"output_type": "stream", "name": "stdout", "text": ["[0 1 2]\n"]}
        ]}),
        json!({"cell_type": "code", "source": "   ", "outputs": []}),
        json!({"cell_type": "code", "source": "x = 2", "outputs": [
            {"output_type": "execute_result", "data": {"text/plain": "array([1, 2, 3])"}, "metadata": {}}
        ]}),
    ])
}

fn fixed_config() -> nb2docx::ConversionConfigBuilder {
    ConversionConfig::builder().timestamp(
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap(),
    )
}

/// Unzip a package and return `(name, contents)` for every XML part.
fn parts(document: &[u8]) -> Vec<(String, String)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(document)).expect("valid zip");
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let name = file.name().to_string();
        if name.ends_with(".xml") {
            let mut text = String::new();
            file.read_to_string(&mut text).unwrap();
            out.push((name, text));
        }
    }
    out
}

fn part(document: &[u8], name: &str) -> String {
    parts(document)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, text)| text)
        .unwrap_or_else(|| panic!("missing part {name}"))
}

/// Concatenated header (or footer) parts.
fn running(document: &[u8], prefix: &str) -> String {
    parts(document)
        .into_iter()
        .filter(|(n, _)| n.starts_with(prefix))
        .map(|(_, text)| text)
        .collect()
}

fn png_base64() -> String {
    let img = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 30, 30]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    STANDARD.encode(bytes.into_inner())
}

// ── Body content ─────────────────────────────────────────────────────────────

#[test]
fn body_carries_title_cells_and_outputs_in_order() {
    let config = fixed_config().title("Lab 1: Arrays").build().unwrap();
    let out = convert_notebook(&sample(), "lab1.ipynb", &config).unwrap();
    let body = part(&out.document, "word/document.xml");

    let order = [
        "Lab 1: Arrays",
        "Results",
        "Some findings below.",
        "first point",
        "In [1]: ",
        "import",
        "[0 1 2]",
        "In [2]: ",
        "[1, 2, 3]",
    ];
    let mut from = 0;
    for needle in order {
        let at = body[from..]
            .find(needle)
            .unwrap_or_else(|| panic!("'{needle}' missing or out of order"));
        from += at + needle.len();
    }

    // Whitespace-only code cell takes no execution count.
    assert!(!body.contains("In [3]"));
    assert!(!body.contains("array(["));

    assert_eq!(out.filename, "lab1.docx");
    assert_eq!(out.stats.total_cells, 4);
    assert_eq!(out.stats.markdown_cells, 1);
    assert_eq!(out.stats.code_cells, 3);
    assert_eq!(out.stats.skipped_cells, 1);
    assert_eq!(out.stats.outputs_rendered, 2);
}

#[test]
fn default_title_used_when_none_given() {
    let out = convert_notebook(&sample(), "lab1.ipynb", &ConversionConfig::default()).unwrap();
    let body = part(&out.document, "word/document.xml");
    assert!(body.contains("Jupyter to word converter"));
}

#[test]
fn notebook_without_cells_still_packages() {
    let out = convert_notebook(&notebook(vec![]), "empty.ipynb", &ConversionConfig::default())
        .unwrap();
    assert_eq!(&out.document[..2], b"PK");
    assert_eq!(out.stats.total_cells, 0);
    assert_eq!(out.stats.body_blocks, 1);
}

// ── Images ───────────────────────────────────────────────────────────────────

#[test]
fn png_output_is_embedded_as_media() {
    let nb = notebook(vec![json!({"cell_type": "code", "source": "plot()", "outputs": [
        {"output_type": "display_data", "data": {"image/png": png_base64(), "text/plain": "<Figure>"}, "metadata": {}}
    ]})]);
    let out = convert_notebook(&nb, "plots.ipynb", &ConversionConfig::default()).unwrap();

    assert_eq!(out.stats.images_embedded, 1);
    assert_eq!(out.stats.image_fallbacks, 0);
    assert!(out.warnings.is_empty());

    let archive = zip::ZipArchive::new(Cursor::new(&out.document)).unwrap();
    assert!(archive.file_names().any(|n| n.starts_with("word/media/")));
}

#[test]
fn undecodable_image_becomes_placeholder_with_warning() {
    let nb = notebook(vec![json!({"cell_type": "code", "source": "plot()", "outputs": [
        {"output_type": "display_data", "data": {"image/png": "bm90IGFuIGltYWdl"}, "metadata": {}}
    ]})]);
    let out = convert_notebook(&nb, "plots.ipynb", &ConversionConfig::default()).unwrap();

    assert_eq!(out.stats.images_embedded, 0);
    assert_eq!(out.stats.image_fallbacks, 1);
    assert_eq!(out.warnings.len(), 1);
    let body = part(&out.document, "word/document.xml");
    assert!(body.contains("[Image: PNG plot/figure]"));
}

// ── Header / footer ──────────────────────────────────────────────────────────

#[test]
fn header_and_footer_slots_are_resolved() {
    let config = fixed_config()
        .title("Week 4")
        .header_left(Field::custom("CS 101"))
        .header_center(Field::Title)
        .header_right(Field::Date)
        .footer_left(Field::Filename)
        .footer_center(Field::page_number(PageFormat::Fraction))
        .footer_right(Field::Time)
        .build()
        .unwrap();
    let out = convert_notebook(&sample(), "week4.ipynb", &config).unwrap();

    let header = running(&out.document, "word/header");
    assert!(header.contains("CS 101"));
    assert!(header.contains("Week 4"));
    assert!(header.contains("3/5/2024"));

    let footer = running(&out.document, "word/footer");
    assert!(footer.contains("week4"));
    assert!(!footer.contains("week4.ipynb"));
    assert!(footer.contains("NUMPAGES"));
    assert!(footer.contains("PAGE"));
    assert!(footer.contains("2:07:09 PM"));
}

#[test]
fn academic_preset_and_settings_blob_layer() {
    let settings = DocumentSettings::from_json(
        r#"{"labTitle": "Lab 7", "headerLeft": {"type": "custom", "customText": "MATH 220", "pageFormat": "brackets"}}"#,
    )
    .unwrap();
    let config = fixed_config()
        .preset(Preset::Academic)
        .settings(settings)
        .build()
        .unwrap();
    let out = convert_notebook(&sample(), "lab7.ipynb", &config).unwrap();

    let header = running(&out.document, "word/header");
    assert!(header.contains("MATH 220"));
    assert!(!header.contains("Course Code"));
    assert!(header.contains("Course Name"));

    let footer = running(&out.document, "word/footer");
    assert!(footer.contains("Page "));
    assert!(footer.contains("Student ID"));

    assert!(part(&out.document, "word/document.xml").contains("Lab 7"));
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[test]
fn rejects_non_notebook_filename_and_empty_content() {
    let err = convert_notebook(&sample(), "report.json", &ConversionConfig::default()).unwrap_err();
    assert!(matches!(err, Nb2DocxError::NotANotebook { .. }));
    assert!(err.is_client_error());

    let err = convert_notebook("", "lab.ipynb", &ConversionConfig::default()).unwrap_err();
    assert!(matches!(err, Nb2DocxError::EmptyNotebook));
}

#[tokio::test]
async fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.ipynb");
    let err = convert(path.to_str().unwrap(), &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Nb2DocxError::FileNotFound { .. }));
}

// ── File output and progress ────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    started: AtomicUsize,
    cells: AtomicUsize,
    rendered: AtomicUsize,
}

impl ConversionProgressCallback for Recorder {
    fn on_conversion_start(&self, total_cells: usize) {
        self.started.store(total_cells, Ordering::SeqCst);
    }

    fn on_cell_complete(&self, _cell_num: usize, _total_cells: usize, _blocks: usize) {
        self.cells.fetch_add(1, Ordering::SeqCst);
    }

    fn on_conversion_complete(&self, _total_cells: usize, rendered_cells: usize) {
        self.rendered.store(rendered_cells, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn converts_file_to_file_with_progress() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lab1.ipynb");
    std::fs::write(&input, sample()).unwrap();
    let output = dir.path().join("lab1.docx");

    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    let stats = convert_to_file(input.to_str().unwrap(), &output, &config)
        .await
        .unwrap();

    let written = std::fs::read(&output).unwrap();
    assert_eq!(written.len(), stats.package_bytes);
    assert_eq!(&written[..2], b"PK");

    assert_eq!(recorder.started.load(Ordering::SeqCst), 4);
    assert_eq!(recorder.cells.load(Ordering::SeqCst), 4);
    assert_eq!(recorder.rendered.load(Ordering::SeqCst), 3);
}
