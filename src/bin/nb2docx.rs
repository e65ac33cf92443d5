//! CLI binary for nb2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use nb2docx::{
    convert, docx_filename, inspect, write_package, ConversionConfig, ConversionProgressCallback,
    DocumentSettings, Field, HeaderFooterConfig, Preset, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: one bar, advanced per cell.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Body blocks produced so far, for the final line.
    blocks: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` reports the cell count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading notebook…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            blocks: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} cells  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_cells: usize) {
        self.activate_bar(total_cells);
    }

    fn on_cell_start(&self, cell_num: usize, _total_cells: usize, kind: &str) {
        self.bar.set_message(format!("cell {cell_num} ({kind})"));
    }

    fn on_cell_complete(&self, _cell_num: usize, _total_cells: usize, blocks: usize) {
        self.blocks.fetch_add(blocks, Ordering::Relaxed);
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_cells: usize, rendered_cells: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}/{} cells rendered  {}",
            green("✔"),
            bold(&rendered_cells.to_string()),
            total_cells,
            dim(&format!("{} blocks", self.blocks.load(Ordering::Relaxed))),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes lab1.docx next to the notebook)
  nb2docx lab1.ipynb

  # Choose the output path and title
  nb2docx lab1.ipynb -o report.docx --title "Lab 1: Intro to NumPy"

  # Ready-made header/footer layout, with one slot overridden
  nb2docx --preset academic --header-left "custom:CS 101" lab1.ipynb

  # Settings saved from the web form
  nb2docx --settings lab-info.json lab1.ipynb

  # Convert from URL
  nb2docx https://example.org/notebooks/demo.ipynb

  # Inspect a notebook without converting
  nb2docx --inspect-only lab1.ipynb

FIELD SYNTAX (--header-* / --footer-*):
  custom:<text>         literal text
  page_number[:format]  brackets (default), page_word, fraction, roman, plain
  date | time | datetime
  filename | title | empty

ENVIRONMENT VARIABLES:
  NB2DOCX_OUTPUT, NB2DOCX_TITLE, NB2DOCX_SETTINGS, NB2DOCX_PRESET,
  NB2DOCX_MARGIN, NB2DOCX_DOWNLOAD_TIMEOUT   Defaults for the matching flags
  RUST_LOG                                   Overrides the log filter
"#;

/// Convert Jupyter notebooks to Word documents.
#[derive(Parser, Debug)]
#[command(
    name = "nb2docx",
    version,
    about = "Convert Jupyter notebooks (.ipynb) to Word documents (.docx)",
    long_about = "Convert Jupyter notebooks (local files or URLs) to Word documents. \
Markdown cells become styled paragraphs, code cells become shaded In [n]: blocks, and \
captured outputs (text, PNG/JPEG figures) follow their cell. Headers and footers carry \
three configurable slots each.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local .ipynb file path or HTTP/HTTPS URL.
    input: String,

    /// Write the document here. Default: the input name with `.docx`.
    #[arg(short, long, env = "NB2DOCX_OUTPUT")]
    output: Option<PathBuf>,

    /// Document title shown at the top of the first page.
    #[arg(long, env = "NB2DOCX_TITLE")]
    title: Option<String>,

    /// JSON file with header/footer settings (`labTitle`, `headerLeft`, …).
    #[arg(long, env = "NB2DOCX_SETTINGS")]
    settings: Option<PathBuf>,

    /// Header/footer preset: academic, professional, minimal.
    #[arg(long, env = "NB2DOCX_PRESET")]
    preset: Option<Preset>,

    #[arg(long, value_name = "FIELD")]
    header_left: Option<Field>,
    #[arg(long, value_name = "FIELD")]
    header_center: Option<Field>,
    #[arg(long, value_name = "FIELD")]
    header_right: Option<Field>,
    #[arg(long, value_name = "FIELD")]
    footer_left: Option<Field>,
    #[arg(long, value_name = "FIELD")]
    footer_center: Option<Field>,
    #[arg(long, value_name = "FIELD")]
    footer_right: Option<Field>,

    /// Page margin in twips (1440 = 1 inch).
    #[arg(long, env = "NB2DOCX_MARGIN", default_value_t = 1440,
          value_parser = clap::value_parser!(u32).range(0..=7200))]
    margin: u32,

    /// Display width of embedded images in pixels.
    #[arg(long, default_value_t = 400)]
    image_width: u32,

    /// Display height of embedded images in pixels.
    #[arg(long, default_value_t = 300)]
    image_height: u32,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "NB2DOCX_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// Print a JSON report (filename, stats, warnings) on stdout.
    #[arg(long, env = "NB2DOCX_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "NB2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Print the notebook summary and resolved header/footer, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NB2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NB2DOCX_QUIET")]
    quiet: bool,
}

/// `--json` report.
#[derive(Serialize)]
struct Report<'a> {
    output: String,
    title: &'a str,
    stats: &'a nb2docx::ConversionStats,
    warnings: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let summary = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect notebook")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
            );
            return Ok(());
        }

        println!("File:         {}", summary.filename);
        println!("Cells:        {}", summary.total_cells);
        println!(
            "  markdown {}  code {} ({} empty)  other {}",
            summary.markdown_cells,
            summary.code_cells,
            summary.empty_code_cells,
            summary.other_cells
        );
        println!(
            "Outputs:      {} ({} images)",
            summary.outputs, summary.image_outputs
        );
        if let Some(ref k) = summary.kernel_name {
            println!("Kernel:       {}", k);
        }
        if let Some(ref l) = summary.language {
            println!("Language:     {}", l);
        }
        if let Some(v) = summary.nbformat {
            println!("nbformat:     {}", v);
        }
        println!("Title:        {}", config.title);
        print_slots(&config, &summary.filename);
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&cli.input, &config)
        .await
        .context("Conversion failed")?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, &output.filename));
    write_package(&output_path, &output.document)?;

    if cli.json {
        let report = Report {
            output: output_path.display().to_string(),
            title: &output.title,
            stats: &output.stats,
            warnings: output.warnings.iter().map(ToString::to_string).collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
        return Ok(());
    }

    if !cli.quiet {
        for warning in &output.warnings {
            eprintln!("  {} {}", cyan("⚠"), warning);
        }
        eprintln!(
            "{}  {} cells  {} images  {}ms  →  {}",
            green("✔"),
            output.stats.total_cells,
            output.stats.images_embedded,
            output.stats.duration_ms,
            bold(&output_path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
///
/// Layering order: preset, then the settings file, then `--title` and individual slot flags.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .margin_twips(cli.margin)
        .image_size(cli.image_width, cli.image_height)
        .download_timeout_secs(cli.download_timeout);

    if let Some(preset) = cli.preset {
        builder = builder.header_footer(HeaderFooterConfig::preset(preset));
    }
    if let Some(ref path) = cli.settings {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings = DocumentSettings::from_json(&json)
            .with_context(|| format!("Invalid settings file {:?}", path))?;
        builder = builder.settings(settings);
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }

    if let Some(f) = cli.header_left.clone() {
        builder = builder.header_left(f);
    }
    if let Some(f) = cli.header_center.clone() {
        builder = builder.header_center(f);
    }
    if let Some(f) = cli.header_right.clone() {
        builder = builder.header_right(f);
    }
    if let Some(f) = cli.footer_left.clone() {
        builder = builder.footer_left(f);
    }
    if let Some(f) = cli.footer_center.clone() {
        builder = builder.footer_center(f);
    }
    if let Some(f) = cli.footer_right.clone() {
        builder = builder.footer_right(f);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// `lab1.ipynb` → `lab1.docx` beside a local input; URL inputs land in the
/// working directory.
fn default_output_path(input: &str, docx_name: &str) -> PathBuf {
    let path = Path::new(input);
    if input.starts_with("http://") || input.starts_with("https://") {
        return PathBuf::from(docx_name);
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(docx_filename)
        .unwrap_or_else(|| docx_name.to_string());
    path.with_file_name(name)
}

fn print_slots(config: &ConversionConfig, filename: &str) {
    let now = config
        .timestamp
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let hf = &config.header_footer;
    for (label, slots) in [("Header", hf.header()), ("Footer", hf.footer())] {
        let rendered: Vec<String> = slots
            .iter()
            .map(|slot| match slot {
                Some(field) => field.preview(Some(filename), &config.title, now),
                None => String::new(),
            })
            .map(|s| if s.is_empty() { dim("—") } else { s })
            .collect();
        println!("{label}:       {}", rendered.join("  |  "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn config_for(args: &[&str]) -> ConversionConfig {
        let cli = Cli::parse_from(std::iter::once("nb2docx").chain(args.iter().copied()));
        build_config(&cli, None).await.unwrap()
    }

    #[tokio::test]
    async fn flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("lab-info.json");
        std::fs::write(
            &settings,
            r#"{"labTitle": "From File", "headerLeft": {"type": "custom", "customText": "FILE", "pageFormat": "brackets"}}"#,
        )
        .unwrap();
        let settings = settings.to_str().unwrap();

        let config = config_for(&["--settings", settings, "lab.ipynb"]).await;
        assert_eq!(config.title, "From File");

        let config = config_for(&[
            "--title",
            "From Flag",
            "--header-left",
            "custom:FLAG",
            "--settings",
            settings,
            "lab.ipynb",
        ])
        .await;
        assert_eq!(config.title, "From Flag");
        assert_eq!(config.header_footer.header_left, Some(Field::custom("FLAG")));
    }

    #[tokio::test]
    async fn title_flag_applies_without_settings() {
        let config = config_for(&["--title", "Lab 1", "lab.ipynb"]).await;
        assert_eq!(config.title, "Lab 1");
    }
}
