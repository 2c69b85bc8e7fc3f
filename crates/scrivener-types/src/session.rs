//! Dialog session types: client identity, the dialog state graph, and the
//! per-client session record.
//!
//! A `Session` is the single mutable record of one client's progress
//! through the configuration dialog. It is only ever mutated by the
//! coordination loop through state-machine-approved transitions; running
//! jobs see an immutable snapshot taken at submission time (see
//! [`crate::job`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::catalog::{
    ColorScheme, Depth, FontFamily, FontSize, HeaderStyle, Language, LineHeight, OutputFormat,
    PageMargin, StyleMode, TemplateId,
};
use crate::error::DialogError;
use crate::job::{CustomLayout, ReportConfiguration, VisualStyle};

/// Opaque client identity supplied by the transport layer.
///
/// The core never interprets it; it is only a map key and a routing
/// address for the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Node in the dialog state graph.
///
/// The graph is linear apart from the styling branch: after
/// `choosing_style_mode` the dialog either picks a ready-made template or
/// walks the custom layout chain, and both branches rejoin at
/// `choosing_format`. Terminal outcomes (delivered, failed, cancelled) are
/// realized as session removal rather than stored states, so they have no
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    ChoosingLanguage,
    GeneratingQuestions,
    Answering,
    ChoosingTitle,
    ChoosingDepth,
    ChoosingStyleMode,
    ChoosingTemplate,
    ChoosingFontSize,
    ChoosingFont,
    ChoosingColors,
    ChoosingLineHeight,
    ChoosingPageMargin,
    ChoosingHeaderStyle,
    ChoosingShowHeader,
    ChoosingFormat,
    AskingComparison,
    EnteringComparison,
    InQueue,
}

impl DialogState {
    /// States in which free text is a valid action. All other states only
    /// accept discrete choices (plus the implicit topic text that creates
    /// a session in the first place).
    pub fn expects_text(self) -> bool {
        matches!(
            self,
            DialogState::Answering | DialogState::ChoosingTitle | DialogState::EnteringComparison
        )
    }

    pub fn id(self) -> &'static str {
        match self {
            DialogState::ChoosingLanguage => "choosing_language",
            DialogState::GeneratingQuestions => "generating_questions",
            DialogState::Answering => "answering",
            DialogState::ChoosingTitle => "choosing_title",
            DialogState::ChoosingDepth => "choosing_depth",
            DialogState::ChoosingStyleMode => "choosing_style_mode",
            DialogState::ChoosingTemplate => "choosing_template",
            DialogState::ChoosingFontSize => "choosing_font_size",
            DialogState::ChoosingFont => "choosing_font",
            DialogState::ChoosingColors => "choosing_colors",
            DialogState::ChoosingLineHeight => "choosing_line_height",
            DialogState::ChoosingPageMargin => "choosing_page_margin",
            DialogState::ChoosingHeaderStyle => "choosing_header_style",
            DialogState::ChoosingShowHeader => "choosing_show_header",
            DialogState::ChoosingFormat => "choosing_format",
            DialogState::AskingComparison => "asking_comparison",
            DialogState::EnteringComparison => "entering_comparison",
            DialogState::InQueue => "in_queue",
        }
    }

    const ALL: &'static [DialogState] = &[
        DialogState::ChoosingLanguage,
        DialogState::GeneratingQuestions,
        DialogState::Answering,
        DialogState::ChoosingTitle,
        DialogState::ChoosingDepth,
        DialogState::ChoosingStyleMode,
        DialogState::ChoosingTemplate,
        DialogState::ChoosingFontSize,
        DialogState::ChoosingFont,
        DialogState::ChoosingColors,
        DialogState::ChoosingLineHeight,
        DialogState::ChoosingPageMargin,
        DialogState::ChoosingHeaderStyle,
        DialogState::ChoosingShowHeader,
        DialogState::ChoosingFormat,
        DialogState::AskingComparison,
        DialogState::EnteringComparison,
        DialogState::InQueue,
    ];
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DialogState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DialogState::ALL
            .iter()
            .copied()
            .find(|v| v.id() == s)
            .ok_or_else(|| format!("unknown dialog state: '{s}'"))
    }
}

/// Accumulated configuration choices. The key set only ever grows as the
/// dialog advances; nothing resets a filled field except session deletion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportChoices {
    pub language: Option<Language>,
    pub depth: Option<Depth>,
    pub style_mode: Option<StyleMode>,
    pub template: Option<TemplateId>,
    pub font_size: Option<FontSize>,
    pub font: Option<FontFamily>,
    pub colors: Option<ColorScheme>,
    pub line_height: Option<LineHeight>,
    pub page_margin: Option<PageMargin>,
    pub header_style: Option<HeaderStyle>,
    pub show_header: Option<bool>,
    pub format: Option<OutputFormat>,
    pub comparison: Option<String>,
}

/// Per-client record of dialog progress and collected configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub client_id: ClientId,
    /// The report topic. Set once at creation, immutable afterwards.
    pub topic: String,
    /// Explicit report title collected in `choosing_title`.
    pub title: Option<String>,
    /// Clarification questions produced on entry to `generating_questions`.
    pub questions: Vec<String>,
    /// Answers to the clarification questions, in question order.
    pub answers: Vec<String>,
    pub choices: ReportChoices,
    pub state: DialogState,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session from the client's first qualifying input.
    pub fn new(client_id: ClientId, topic: impl Into<String>) -> Self {
        Self {
            client_id,
            topic: topic.into(),
            title: None,
            questions: Vec::new(),
            answers: Vec::new(),
            choices: ReportChoices::default(),
            state: DialogState::ChoosingLanguage,
            started_at: Utc::now(),
        }
    }

    /// Index of the next unanswered clarification question, or `None` once
    /// every question has an answer.
    pub fn next_question(&self) -> Option<(usize, &str)> {
        self.questions
            .get(self.answers.len())
            .map(|q| (self.answers.len(), q.as_str()))
    }

    /// Resolve the accumulated choices into an immutable generation
    /// configuration. Fails with [`DialogError::IncompleteSession`] naming
    /// the first missing field when the dialog skipped a step.
    pub fn finalize(&self) -> Result<ReportConfiguration, DialogError> {
        let missing = |field: &'static str| DialogError::IncompleteSession { missing: field };

        let language = self.choices.language.ok_or(missing("language"))?;
        let depth = self.choices.depth.ok_or(missing("depth"))?;
        let format = self.choices.format.ok_or(missing("format"))?;

        let style = match self.choices.style_mode.ok_or(missing("style_mode"))? {
            StyleMode::Template => VisualStyle::Template {
                template: self.choices.template.ok_or(missing("template"))?,
            },
            StyleMode::Custom => VisualStyle::Custom {
                layout: CustomLayout {
                    font_size: self.choices.font_size.ok_or(missing("font_size"))?,
                    font: self.choices.font.ok_or(missing("font"))?,
                    colors: self.choices.colors.ok_or(missing("colors"))?,
                    line_height: self.choices.line_height.ok_or(missing("line_height"))?,
                    page_margin: self.choices.page_margin.ok_or(missing("page_margin"))?,
                    header_style: self.choices.header_style.ok_or(missing("header_style"))?,
                    show_header: self.choices.show_header.ok_or(missing("show_header"))?,
                },
            },
        };

        Ok(ReportConfiguration {
            topic: self.topic.clone(),
            title: self.title.clone(),
            answers: self.answers.clone(),
            language,
            depth,
            style,
            format,
            comparison: self.choices.comparison.clone(),
        })
    }
}
