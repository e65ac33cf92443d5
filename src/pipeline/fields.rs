//! Header/footer fields: what goes in each of the six running slots.
//!
//! A [`Field`] is a closed sum type over the eight content kinds; only the
//! page-number variant carries a page format and only the custom variant
//! carries text. On the wire a field is the flat `{type, customText,
//! pageFormat}` record the web form posts, converted through [`RawField`] so
//! that unknown types and formats degrade instead of failing to parse.

use crate::document::{Inline, PageField, PageFieldKind, TextRun};
use crate::style;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Field model ──────────────────────────────────────────────────────────

/// How a page-number field is decorated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageFormat {
    /// `[n]`
    #[default]
    Brackets,
    /// `Page n`
    PageWord,
    /// `n/total`
    Fraction,
    /// lower-case roman numeral
    Roman,
    /// bare `n`
    Plain,
}

impl PageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            PageFormat::Brackets => "brackets",
            PageFormat::PageWord => "page_word",
            PageFormat::Fraction => "fraction",
            PageFormat::Roman => "roman",
            PageFormat::Plain => "plain",
        }
    }

    /// Parse a format name; anything unrecognised is [`PageFormat::Brackets`].
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "page_word" => PageFormat::PageWord,
            "fraction" => PageFormat::Fraction,
            "roman" => PageFormat::Roman,
            "plain" => PageFormat::Plain,
            _ => PageFormat::Brackets,
        }
    }
}

/// Content of one header/footer slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub enum Field {
    Custom { text: String },
    PageNumber { format: PageFormat },
    Date,
    Time,
    DateTime,
    Filename,
    Title,
    #[default]
    Empty,
}

impl Field {
    pub fn custom(text: impl Into<String>) -> Self {
        Field::Custom { text: text.into() }
    }

    pub fn page_number(format: PageFormat) -> Self {
        Field::PageNumber { format }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Field::Custom { .. } => "custom",
            Field::PageNumber { .. } => "page_number",
            Field::Date => "date",
            Field::Time => "time",
            Field::DateTime => "datetime",
            Field::Filename => "filename",
            Field::Title => "title",
            Field::Empty => "empty",
        }
    }

    /// Plain-text approximation of what the slot will show, with sample page
    /// numbers standing in for live page tokens.
    pub fn preview(&self, filename: Option<&str>, title: &str, now: NaiveDateTime) -> String {
        match self {
            Field::Custom { text } if text.is_empty() => "Custom Text".to_string(),
            Field::Custom { text } => text.clone(),
            Field::PageNumber { format } => match format {
                PageFormat::Brackets => "[1]",
                PageFormat::PageWord => "Page 1",
                PageFormat::Fraction => "1/10",
                PageFormat::Roman => "i",
                PageFormat::Plain => "1",
            }
            .to_string(),
            Field::Date => format_date(now),
            Field::Time => format_time(now),
            Field::DateTime => format_datetime(now),
            Field::Filename => filename
                .map(strip_notebook_suffix)
                .unwrap_or("notebook")
                .to_string(),
            Field::Title if title.is_empty() => "Document Title".to_string(),
            Field::Title => title.to_string(),
            Field::Empty => String::new(),
        }
    }
}

impl fmt::Display for Field {
    /// The `type[:argument]` form accepted by [`Field::from_str`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Custom { text } => write!(f, "custom:{text}"),
            Field::PageNumber { format } => write!(f, "page_number:{}", format.as_str()),
            other => f.write_str(other.type_name()),
        }
    }
}

impl FromStr for Field {
    type Err = String;

    /// Parse `type[:argument]`, e.g. `custom:Course Name`, `page_number:roman`,
    /// `date`. The argument is the custom text or the page format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg)),
            None => (s.trim(), None),
        };
        match kind {
            "custom" => Ok(Field::custom(arg.unwrap_or_default())),
            "page_number" => Ok(Field::page_number(
                arg.map(|a| PageFormat::parse_lossy(a.trim()))
                    .unwrap_or_default(),
            )),
            "date" => Ok(Field::Date),
            "time" => Ok(Field::Time),
            "datetime" => Ok(Field::DateTime),
            "filename" => Ok(Field::Filename),
            "title" => Ok(Field::Title),
            "empty" | "" => Ok(Field::Empty),
            other => Err(format!(
                "unknown field type '{other}' (expected custom, page_number, date, time, \
                 datetime, filename, title or empty)"
            )),
        }
    }
}

/// Flat wire shape of a [`Field`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawField {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "customText", default)]
    pub custom_text: Option<String>,
    #[serde(rename = "pageFormat", default)]
    pub page_format: Option<String>,
}

impl From<RawField> for Field {
    fn from(raw: RawField) -> Self {
        match raw.kind.as_deref() {
            Some("custom") => Field::Custom {
                text: raw.custom_text.unwrap_or_default(),
            },
            Some("page_number") => Field::PageNumber {
                format: raw
                    .page_format
                    .as_deref()
                    .map(PageFormat::parse_lossy)
                    .unwrap_or_default(),
            },
            Some("date") => Field::Date,
            Some("time") => Field::Time,
            Some("datetime") => Field::DateTime,
            Some("filename") => Field::Filename,
            Some("title") => Field::Title,
            _ => Field::Empty,
        }
    }
}

impl From<Field> for RawField {
    fn from(field: Field) -> Self {
        let kind = Some(field.type_name().to_string());
        match field {
            Field::Custom { text } => RawField {
                kind,
                custom_text: Some(text),
                page_format: None,
            },
            Field::PageNumber { format } => RawField {
                kind,
                custom_text: None,
                page_format: Some(format.as_str().to_string()),
            },
            _ => RawField {
                kind,
                ..RawField::default()
            },
        }
    }
}

// ── Header/footer layout ─────────────────────────────────────────────────

/// The six running slots. `None` renders as an empty slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterConfig {
    #[serde(default)]
    pub header_left: Option<Field>,
    #[serde(default)]
    pub header_center: Option<Field>,
    #[serde(default)]
    pub header_right: Option<Field>,
    #[serde(default)]
    pub footer_left: Option<Field>,
    #[serde(default)]
    pub footer_center: Option<Field>,
    #[serde(default)]
    pub footer_right: Option<Field>,
}

/// Ready-made header/footer layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Academic,
    Professional,
    Minimal,
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "academic" => Ok(Preset::Academic),
            "professional" => Ok(Preset::Professional),
            "minimal" => Ok(Preset::Minimal),
            other => Err(format!(
                "unknown preset '{other}' (expected academic, professional or minimal)"
            )),
        }
    }
}

impl HeaderFooterConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Academic => Self {
                header_left: Some(Field::custom("Course Code")),
                header_center: Some(Field::Date),
                header_right: Some(Field::custom("Course Name")),
                footer_left: Some(Field::custom("[Lab Assignment]")),
                footer_center: Some(Field::page_number(PageFormat::PageWord)),
                footer_right: Some(Field::custom("[Student ID]")),
            },
            Preset::Professional => Self {
                header_left: Some(Field::Title),
                header_center: Some(Field::Empty),
                header_right: Some(Field::DateTime),
                footer_left: Some(Field::Filename),
                footer_center: Some(Field::page_number(PageFormat::Fraction)),
                footer_right: Some(Field::custom("Generated by nb2docx")),
            },
            Preset::Minimal => Self {
                header_left: Some(Field::Empty),
                header_center: Some(Field::Title),
                header_right: Some(Field::Empty),
                footer_left: Some(Field::Empty),
                footer_center: Some(Field::page_number(PageFormat::Plain)),
                footer_right: Some(Field::Empty),
            },
        }
    }

    /// Header slots in left/center/right order.
    pub fn header(&self) -> [Option<&Field>; 3] {
        [
            self.header_left.as_ref(),
            self.header_center.as_ref(),
            self.header_right.as_ref(),
        ]
    }

    /// Footer slots in left/center/right order.
    pub fn footer(&self) -> [Option<&Field>; 3] {
        [
            self.footer_left.as_ref(),
            self.footer_center.as_ref(),
            self.footer_right.as_ref(),
        ]
    }
}

// ── Resolution ───────────────────────────────────────────────────────────

/// Ambient values a field may draw on. `now` is captured once per
/// conversion so every date/time slot agrees.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub filename: &'a str,
    pub title: &'a str,
    pub now: NaiveDateTime,
}

/// Resolve one slot to inline content.
///
/// Never fails: an absent field, an empty field and an unrecognised field all
/// become a single empty text run.
pub fn resolve_field(field: Option<&Field>, ctx: &FieldContext<'_>) -> Vec<Inline> {
    let Some(field) = field else {
        return vec![text_run("")];
    };
    match field {
        Field::Custom { text } => vec![text_run(text)],
        Field::PageNumber { format } => page_number(*format),
        Field::Date => vec![text_run(&format_date(ctx.now))],
        Field::Time => vec![text_run(&format_time(ctx.now))],
        Field::DateTime => vec![text_run(&format_datetime(ctx.now))],
        Field::Filename => vec![text_run(strip_notebook_suffix(ctx.filename))],
        Field::Title => vec![text_run(ctx.title)],
        Field::Empty => vec![text_run("")],
    }
}

fn page_number(format: PageFormat) -> Vec<Inline> {
    let current = || Inline::Field(PageField::new(PageFieldKind::CurrentPage));
    match format {
        PageFormat::Brackets => vec![decoration("["), current(), decoration("]")],
        PageFormat::PageWord => vec![decoration("Page "), current()],
        PageFormat::Fraction => vec![
            current(),
            decoration("/"),
            Inline::Field(PageField::new(PageFieldKind::TotalPages)),
        ],
        PageFormat::Roman => vec![Inline::Field(PageField::new(
            PageFieldKind::CurrentPageRoman,
        ))],
        PageFormat::Plain => vec![current()],
    }
}

fn text_run(text: &str) -> Inline {
    Inline::Text(TextRun::text(text, style::SIZE_FIELD_TEXT))
}

fn decoration(text: &str) -> Inline {
    Inline::Text(TextRun::text(text, style::SIZE_PAGE_NUMBER))
}

fn strip_notebook_suffix(name: &str) -> &str {
    name.strip_suffix(".ipynb").unwrap_or(name)
}

fn format_date(now: NaiveDateTime) -> String {
    now.format("%-m/%-d/%Y").to_string()
}

fn format_time(now: NaiveDateTime) -> String {
    now.format("%-I:%M:%S %p").to_string()
}

fn format_datetime(now: NaiveDateTime) -> String {
    format!("{}, {}", format_date(now), format_time(now))
}
