//! Configuration types for notebook-to-document conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The web form's header/footer blob
//! arrives as [`DocumentSettings`] and is folded into the config with
//! [`ConversionConfigBuilder::settings`].

use crate::error::Nb2DocxError;
use crate::pipeline::fields::{Field, HeaderFooterConfig, Preset};
use crate::progress::ProgressCallback;
use crate::style;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted page margin: 5 inches.
pub const MAX_MARGIN_TWIPS: u32 = 7200;

/// Configuration for a notebook-to-document conversion.
///
/// # Example
/// ```rust
/// use nb2docx::{ConversionConfig, Field, PageFormat};
///
/// let config = ConversionConfig::builder()
///     .title("Lab 3: Regression")
///     .footer_center(Field::page_number(PageFormat::Fraction))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Document title, shown as the centered heading and available to
    /// `title` fields. Default: "Jupyter to word converter".
    pub title: String,

    /// The six running header/footer slots. Default: all empty.
    pub header_footer: HeaderFooterConfig,

    /// Uniform page margin in twips (1440 = 1 inch). Range: 0–7200.
    pub margin_twips: u32,

    /// Display width of embedded images in pixels. Default: 400.
    pub image_width: u32,

    /// Display height of embedded images in pixels. Default: 300.
    pub image_height: u32,

    /// Fixed timestamp for date/time fields. When `None` the local wall clock
    /// is read once at the start of each conversion.
    pub timestamp: Option<NaiveDateTime>,

    /// Download timeout for URL inputs in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Optional per-cell progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            title: style::DEFAULT_TITLE.to_string(),
            header_footer: HeaderFooterConfig::default(),
            margin_twips: style::DEFAULT_MARGIN_TWIPS,
            image_width: style::DEFAULT_IMAGE_WIDTH,
            image_height: style::DEFAULT_IMAGE_HEIGHT,
            timestamp: None,
            download_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("title", &self.title)
            .field("header_footer", &self.header_footer)
            .field("margin_twips", &self.margin_twips)
            .field("image_width", &self.image_width)
            .field("image_height", &self.image_height)
            .field("timestamp", &self.timestamp)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// A copy of this configuration with a settings blob applied on top.
    pub fn with_settings(&self, settings: DocumentSettings) -> Result<Self, Nb2DocxError> {
        ConversionConfigBuilder {
            config: self.clone(),
        }
        .settings(settings)
        .build()
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    /// Set the title. Blank titles fall back to the default at build time.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn header_footer(mut self, hf: HeaderFooterConfig) -> Self {
        self.config.header_footer = hf;
        self
    }

    pub fn preset(mut self, preset: Preset) -> Self {
        self.config.header_footer = HeaderFooterConfig::preset(preset);
        self
    }

    pub fn header_left(mut self, field: Field) -> Self {
        self.config.header_footer.header_left = Some(field);
        self
    }

    pub fn header_center(mut self, field: Field) -> Self {
        self.config.header_footer.header_center = Some(field);
        self
    }

    pub fn header_right(mut self, field: Field) -> Self {
        self.config.header_footer.header_right = Some(field);
        self
    }

    pub fn footer_left(mut self, field: Field) -> Self {
        self.config.header_footer.footer_left = Some(field);
        self
    }

    pub fn footer_center(mut self, field: Field) -> Self {
        self.config.header_footer.footer_center = Some(field);
        self
    }

    pub fn footer_right(mut self, field: Field) -> Self {
        self.config.header_footer.footer_right = Some(field);
        self
    }

    /// Apply the web form's settings blob. A non-blank `labTitle` replaces the
    /// title; every slot the blob mentions replaces the current one.
    pub fn settings(mut self, settings: DocumentSettings) -> Self {
        if let Some(title) = settings.lab_title.filter(|t| !t.trim().is_empty()) {
            self.config.title = title;
        }
        let hf = &mut self.config.header_footer;
        let slots = settings.fields;
        macro_rules! apply {
            ($($slot:ident),*) => {
                $( if slots.$slot.is_some() { hf.$slot = slots.$slot; } )*
            };
        }
        apply!(
            header_left,
            header_center,
            header_right,
            footer_left,
            footer_center,
            footer_right
        );
        self
    }

    pub fn margin_twips(mut self, twips: u32) -> Self {
        self.config.margin_twips = twips;
        self
    }

    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.config.image_width = width;
        self.config.image_height = height;
        self
    }

    pub fn timestamp(mut self, at: NaiveDateTime) -> Self {
        self.config.timestamp = Some(at);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ConversionConfig, Nb2DocxError> {
        let c = &mut self.config;
        if c.title.trim().is_empty() {
            c.title = style::DEFAULT_TITLE.to_string();
        }
        if c.margin_twips > MAX_MARGIN_TWIPS {
            return Err(Nb2DocxError::InvalidConfig(format!(
                "Margin must be 0–{} twips, got {}",
                MAX_MARGIN_TWIPS, c.margin_twips
            )));
        }
        if c.image_width == 0 || c.image_height == 0 {
            return Err(Nb2DocxError::InvalidConfig(format!(
                "Image size must be at least 1×1, got {}×{}",
                c.image_width, c.image_height
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(Nb2DocxError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Settings blob ────────────────────────────────────────────────────────

/// Header/footer settings as posted by the web form alongside an upload:
///
/// ```json
/// { "labTitle": "Lab 3",
///   "headerLeft": {"type": "custom", "customText": "CS 101", "pageFormat": "brackets"},
///   "footerCenter": {"type": "page_number", "customText": "", "pageFormat": "fraction"} }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    #[serde(default)]
    pub lab_title: Option<String>,
    #[serde(flatten)]
    pub fields: HeaderFooterConfig,
}

impl DocumentSettings {
    pub fn from_json(json: &str) -> Result<Self, Nb2DocxError> {
        serde_json::from_str(json)
            .map_err(|e| Nb2DocxError::InvalidConfig(format!("Invalid document settings: {e}")))
    }
}
