//! Choice catalogs for the configuration dialog.
//!
//! Each catalog is a closed enum with a stable wire id (used as the choice
//! id in discrete actions and in serialized configurations) and a human
//! label for rendering option keyboards. The ids double as the serde
//! representation so a configuration round-trips without mapping tables.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Text direction of a report language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Rtl,
    Ltr,
}

/// Report language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    English,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::Arabic, Language::English];

    pub fn id(self) -> &'static str {
        match self {
            Language::Arabic => "arabic",
            Language::English => "english",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Arabic => "العربية",
            Language::English => "English",
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Language::Arabic => TextDirection::Rtl,
            Language::English => TextDirection::Ltr,
        }
    }
}

/// Report depth. Carries the structural hints handed to the generator:
/// how many body sections and roughly how many words per section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl Depth {
    pub const ALL: &'static [Depth] =
        &[Depth::Short, Depth::Medium, Depth::Long, Depth::VeryLong];

    pub fn id(self) -> &'static str {
        match self {
            Depth::Short => "short",
            Depth::Medium => "medium",
            Depth::Long => "long",
            Depth::VeryLong => "very_long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Depth::Short => "Short (2-3 pages)",
            Depth::Medium => "Medium (4-6 pages)",
            Depth::Long => "Long (7-10 pages)",
            Depth::VeryLong => "Very long (10-15 pages)",
        }
    }

    /// Number of body sections the generator is asked to produce.
    pub fn section_count(self) -> u32 {
        match self {
            Depth::Short => 2,
            Depth::Medium | Depth::Long => 4,
            Depth::VeryLong => 6,
        }
    }

    /// Inclusive word range per body section.
    pub fn section_words(self) -> (u32, u32) {
        match self {
            Depth::Short => (150, 200),
            Depth::Medium => (200, 300),
            Depth::Long => (300, 400),
            Depth::VeryLong => (400, 500),
        }
    }

    /// Inclusive word range for the conclusion.
    pub fn conclusion_words(self) -> (u32, u32) {
        match self {
            Depth::Short => (80, 100),
            Depth::Medium => (100, 150),
            Depth::Long => (150, 200),
            Depth::VeryLong => (200, 250),
        }
    }
}

/// Ready-made visual template. Only the identity lives here; the actual
/// page markup belongs to the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    Classic,
    Modern,
    Minimal,
    Colorful,
    Professional,
}

impl TemplateId {
    pub const ALL: &'static [TemplateId] = &[
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Minimal,
        TemplateId::Colorful,
        TemplateId::Professional,
    ];

    pub fn id(self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
            TemplateId::Colorful => "colorful",
            TemplateId::Professional => "professional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateId::Classic => "Classic academic",
            TemplateId::Modern => "Modern",
            TemplateId::Minimal => "Minimal",
            TemplateId::Colorful => "Colorful",
            TemplateId::Professional => "Professional",
        }
    }
}

/// Final artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Docx,
}

impl OutputFormat {
    pub const ALL: &'static [OutputFormat] = &[OutputFormat::Pdf, OutputFormat::Docx];

    pub fn id(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "PDF",
            OutputFormat::Docx => "Word (DOCX)",
        }
    }

    pub fn file_extension(self) -> &'static str {
        self.id()
    }
}

/// How the visual appearance is configured: a ready-made template or a
/// step-by-step custom layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    Template,
    Custom,
}

impl StyleMode {
    pub const ALL: &'static [StyleMode] = &[StyleMode::Template, StyleMode::Custom];

    pub fn id(self) -> &'static str {
        match self {
            StyleMode::Template => "template",
            StyleMode::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StyleMode::Template => "Ready-made template",
            StyleMode::Custom => "Custom layout",
        }
    }
}

/// Body font size for the custom layout branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

impl FontSize {
    pub const ALL: &'static [FontSize] = &[FontSize::Small, FontSize::Medium, FontSize::Large];

    pub fn id(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontSize::Small => "Small (12pt)",
            FontSize::Medium => "Medium (14pt)",
            FontSize::Large => "Large (16pt)",
        }
    }

    pub fn points(self) -> u32 {
        match self {
            FontSize::Small => 12,
            FontSize::Medium => 14,
            FontSize::Large => 16,
        }
    }
}

/// Body font family for the custom layout branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Amiri,
    Cairo,
    Arial,
    Times,
}

impl FontFamily {
    pub const ALL: &'static [FontFamily] = &[
        FontFamily::Amiri,
        FontFamily::Cairo,
        FontFamily::Arial,
        FontFamily::Times,
    ];

    pub fn id(self) -> &'static str {
        match self {
            FontFamily::Amiri => "amiri",
            FontFamily::Cairo => "cairo",
            FontFamily::Arial => "arial",
            FontFamily::Times => "times",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontFamily::Amiri => "Amiri",
            FontFamily::Cairo => "Cairo",
            FontFamily::Arial => "Arial",
            FontFamily::Times => "Times New Roman",
        }
    }
}

/// Accent color scheme for the custom layout branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Charcoal,
    Indigo,
    Emerald,
    Crimson,
}

impl ColorScheme {
    pub const ALL: &'static [ColorScheme] = &[
        ColorScheme::Charcoal,
        ColorScheme::Indigo,
        ColorScheme::Emerald,
        ColorScheme::Crimson,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ColorScheme::Charcoal => "charcoal",
            ColorScheme::Indigo => "indigo",
            ColorScheme::Emerald => "emerald",
            ColorScheme::Crimson => "crimson",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorScheme::Charcoal => "Charcoal",
            ColorScheme::Indigo => "Indigo",
            ColorScheme::Emerald => "Emerald",
            ColorScheme::Crimson => "Crimson",
        }
    }
}

/// Line height for the custom layout branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineHeight {
    Compact,
    Normal,
    Relaxed,
}

impl LineHeight {
    pub const ALL: &'static [LineHeight] = &[
        LineHeight::Compact,
        LineHeight::Normal,
        LineHeight::Relaxed,
    ];

    pub fn id(self) -> &'static str {
        match self {
            LineHeight::Compact => "compact",
            LineHeight::Normal => "normal",
            LineHeight::Relaxed => "relaxed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LineHeight::Compact => "Compact (1.5)",
            LineHeight::Normal => "Normal (1.8)",
            LineHeight::Relaxed => "Relaxed (2.0)",
        }
    }

    pub fn factor(self) -> f32 {
        match self {
            LineHeight::Compact => 1.5,
            LineHeight::Normal => 1.8,
            LineHeight::Relaxed => 2.0,
        }
    }
}

/// Page margin for the custom layout branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMargin {
    Narrow,
    Normal,
    Wide,
}

impl PageMargin {
    pub const ALL: &'static [PageMargin] =
        &[PageMargin::Narrow, PageMargin::Normal, PageMargin::Wide];

    pub fn id(self) -> &'static str {
        match self {
            PageMargin::Narrow => "narrow",
            PageMargin::Normal => "normal",
            PageMargin::Wide => "wide",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PageMargin::Narrow => "Narrow (2cm)",
            PageMargin::Normal => "Normal (2.5cm)",
            PageMargin::Wide => "Wide (3cm)",
        }
    }

    pub fn centimeters(self) -> f32 {
        match self {
            PageMargin::Narrow => 2.0,
            PageMargin::Normal => 2.5,
            PageMargin::Wide => 3.0,
        }
    }
}

/// Section heading style for the custom layout branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    Banded,
    Underlined,
    Plain,
}

impl HeaderStyle {
    pub const ALL: &'static [HeaderStyle] = &[
        HeaderStyle::Banded,
        HeaderStyle::Underlined,
        HeaderStyle::Plain,
    ];

    pub fn id(self) -> &'static str {
        match self {
            HeaderStyle::Banded => "banded",
            HeaderStyle::Underlined => "underlined",
            HeaderStyle::Plain => "plain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HeaderStyle::Banded => "Banded",
            HeaderStyle::Underlined => "Underlined",
            HeaderStyle::Plain => "Plain",
        }
    }
}

macro_rules! impl_catalog_str {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.id() == s)
                    .ok_or_else(|| format!(concat!("unknown ", stringify!($ty), ": '{}'"), s))
            }
        }
    };
}

impl_catalog_str!(Language);
impl_catalog_str!(Depth);
impl_catalog_str!(TemplateId);
impl_catalog_str!(OutputFormat);
impl_catalog_str!(StyleMode);
impl_catalog_str!(FontSize);
impl_catalog_str!(FontFamily);
impl_catalog_str!(ColorScheme);
impl_catalog_str!(LineHeight);
impl_catalog_str!(PageMargin);
impl_catalog_str!(HeaderStyle);
