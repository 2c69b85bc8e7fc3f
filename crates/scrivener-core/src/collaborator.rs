//! Collaborator port definitions.
//!
//! The core treats content generation, clarification questions, and result
//! delivery as opaque, possibly-slow, possibly-failing operations behind
//! these traits. Implementations live in `scrivener-infra` (HTTP adapters)
//! and in test code (hand-rolled mocks).
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition), the same
//! pattern as the repository traits elsewhere in the workspace.

use scrivener_types::catalog::Language;
use scrivener_types::error::{DeliveryError, GenerationError, QuestionError};
use scrivener_types::job::{GeneratedReport, ReportConfiguration, StatusHandle};
use scrivener_types::session::ClientId;

/// Produces the finished report artifact for a finalized configuration.
///
/// May take tens of seconds. The worker pool retries transient failures up
/// to its attempt limit and never issues concurrent calls for one job.
pub trait ReportGenerator: Send + Sync {
    fn generate(
        &self,
        configuration: &ReportConfiguration,
    ) -> impl std::future::Future<Output = Result<GeneratedReport, GenerationError>> + Send;
}

/// Delivers results or error messages back to the originating client.
///
/// Best effort: failures are logged by the caller, never retried, and must
/// not prevent cleanup. The optional status handle references an earlier
/// status message the implementation may update or remove.
pub trait Notifier: Send + Sync {
    fn send_result(
        &self,
        client_id: &ClientId,
        report: &GeneratedReport,
        status_handle: Option<&StatusHandle>,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;

    fn send_error(
        &self,
        client_id: &ClientId,
        message: &str,
        status_handle: Option<&StatusHandle>,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;
}

/// Produces clarification questions for a topic.
///
/// Failure is expected and non-fatal: the dialog degrades by skipping the
/// answering phase entirely.
pub trait QuestionGenerator: Send + Sync {
    fn ask(
        &self,
        topic: &str,
        language: Language,
    ) -> impl std::future::Future<Output = Result<Vec<String>, QuestionError>> + Send;
}
