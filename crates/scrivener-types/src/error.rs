//! Error families for the Scrivener service.
//!
//! Dialog and admission errors are recoverable values handled at the
//! coordination boundary; generation and delivery errors are handled at
//! the job boundary inside the worker pool. Only configuration errors are
//! fatal, and only at startup.

use thiserror::Error;

use crate::session::DialogState;

/// Recoverable dialog-level faults. Every variant produces a guidance
/// reply; none of them mutates the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    /// A discrete choice was generated for a state the session has since
    /// left (duplicate tap, superseded keyboard).
    #[error("stale action: expected state '{expected}', session is in '{actual}'")]
    StaleAction {
        expected: DialogState,
        actual: DialogState,
    },

    /// Action referenced a client with no live session.
    #[error("no live session for this client")]
    SessionExpired,

    /// Choice id not in the catalog for the current state.
    #[error("unknown choice '{choice_id}'")]
    UnknownChoice { choice_id: String },

    /// A required choice was missing at submission time.
    #[error("session incomplete: missing '{missing}'")]
    IncompleteSession { missing: &'static str },
}

/// Admission queue rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Queue at capacity; the submission is refused and the session kept
    /// intact so the client can retry without redoing the dialog.
    #[error("admission queue full (capacity {capacity})")]
    QueueFull { capacity: usize },
}

/// Clarification-question generation failures. Never fatal: the dialog
/// degrades to `choosing_depth` with an empty answer set.
#[derive(Debug, Clone, Error)]
pub enum QuestionError {
    #[error("question generator unavailable: {0}")]
    Upstream(String),

    #[error("question generator returned no questions")]
    Empty,
}

/// Report generation failures.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The generated content did not parse into the expected report
    /// structure. Transient: the worker pool retries these.
    #[error("generated content malformed: {0}")]
    MalformedContent(String),

    /// The generation service itself failed or was unreachable.
    #[error("generation service error: {0}")]
    Upstream(String),

    /// The service answered but the response envelope was unusable.
    #[error("invalid generator response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether the worker pool should retry this failure. Only structural
    /// parsing failures of the generated content qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::MalformedContent(_))
    }
}

/// Result delivery failures. Logged only: delivery problems never block
/// cleanup and never count as job failure.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("delivery endpoint error: {0}")]
    Upstream(String),

    #[error("delivery rejected with status {status}")]
    Rejected { status: u16 },
}

/// Startup configuration faults. The only fatal error family; the process
/// refuses to accept any client action with an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("missing required credential in environment variable {var}")]
    MissingCredential { var: &'static str },

    #[error("failed to read config file: {0}")]
    Unreadable(String),

    #[error("failed to parse config file: {0}")]
    Unparsable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_action_display_names_both_states() {
        let err = DialogError::StaleAction {
            expected: DialogState::ChoosingDepth,
            actual: DialogState::ChoosingTemplate,
        };
        let msg = err.to_string();
        assert!(msg.contains("choosing_depth"));
        assert!(msg.contains("choosing_template"));
    }

    #[test]
    fn test_queue_full_display() {
        let err = AdmissionError::QueueFull { capacity: 50 };
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_generation_transience() {
        assert!(GenerationError::MalformedContent("missing conclusion".into()).is_transient());
        assert!(!GenerationError::Upstream("503".into()).is_transient());
        assert!(!GenerationError::InvalidResponse("not json".into()).is_transient());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingCredential {
            var: "SCRIVENER_GENERATOR_API_KEY",
        };
        assert!(err.to_string().contains("SCRIVENER_GENERATOR_API_KEY"));
    }
}
