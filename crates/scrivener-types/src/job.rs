//! Job snapshot types.
//!
//! A `Job` is the immutable unit of work handed to the admission queue: a
//! deep copy of everything the generator needs, severed from the live
//! session so later dialog activity by the same client cannot affect an
//! in-flight generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

use crate::catalog::{
    ColorScheme, Depth, FontFamily, FontSize, HeaderStyle, Language, LineHeight, OutputFormat,
    PageMargin, TemplateId,
};
use crate::session::ClientId;

/// Opaque reference to a previously delivered status message.
///
/// Supplied by the transport with the submitting action; the notifier may
/// use it to update or remove that message when the result arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHandle(String);

impl StatusHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully resolved custom layout (every field chosen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLayout {
    pub font_size: FontSize,
    pub font: FontFamily,
    pub colors: ColorScheme,
    pub line_height: LineHeight,
    pub page_margin: PageMargin,
    pub header_style: HeaderStyle,
    pub show_header: bool,
}

/// Resolved visual appearance: either a ready-made template or a custom
/// layout built step by step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VisualStyle {
    Template { template: TemplateId },
    Custom { layout: CustomLayout },
}

/// Everything the external generator needs to produce one report.
///
/// Deep-copied from the session at submission; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfiguration {
    pub topic: String,
    pub title: Option<String>,
    pub answers: Vec<String>,
    pub language: Language,
    pub depth: Depth,
    pub style: VisualStyle,
    pub format: OutputFormat,
    pub comparison: Option<String>,
}

/// An admitted generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub client_id: ClientId,
    pub configuration: ReportConfiguration,
    pub status_handle: Option<StatusHandle>,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        client_id: ClientId,
        configuration: ReportConfiguration,
        status_handle: Option<StatusHandle>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            client_id,
            configuration,
            status_handle,
            submitted_at: Utc::now(),
        }
    }
}

/// Result of a generation call: the rendered artifact plus its title.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub title: String,
    pub artifact: Vec<u8>,
    pub format: OutputFormat,
}

/// Terminal outcome of one job's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Delivered,
    Failed,
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Delivered => write!(f, "delivered"),
            JobOutcome::Failed => write!(f, "failed"),
        }
    }
}
