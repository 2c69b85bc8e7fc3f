//! The coordination loop.
//!
//! One tokio task owns every piece of mutable per-client state: the
//! session store and the position board. All mutation funnels through the
//! command channel, so the dialog layer is sequential and lock-free by
//! construction -- client actions, cancellations, and worker-pool events
//! are applied one at a time, in arrival order.
//!
//! The loop never awaits report generation. Its only suspension points
//! are the command channel itself and the (inline, cheap) clarification
//! question call inside a language transition.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use scrivener_types::action::{ClientAction, Reply};
use scrivener_types::error::AdmissionError;
use scrivener_types::job::{Job, JobOutcome, StatusHandle};
use scrivener_types::session::{ClientId, DialogState, Session};

use crate::collaborator::QuestionGenerator;
use crate::dialog::prompts;
use crate::dialog::{Applied, StateMachine};
use crate::queue::{AdmissionQueue, PositionBoard};
use crate::session::SessionStore;

/// Buffered commands before senders are backpressured.
const COMMAND_BUFFER: usize = 64;

/// Everything the coordination loop reacts to.
#[derive(Debug)]
pub enum CoordinatorCommand {
    /// A client action from the dialog surface.
    Action {
        action: ClientAction,
        reply: oneshot::Sender<Reply>,
    },

    /// Explicit cancellation request.
    Cancel {
        client_id: ClientId,
        reply: oneshot::Sender<Reply>,
    },

    /// A job left the queue for a concurrency slot (from the worker pool).
    JobStarted { client_id: ClientId },

    /// A job finished, whatever the outcome (from the worker pool).
    JobFinished {
        client_id: ClientId,
        outcome: JobOutcome,
    },
}

/// The coordinator task has shut down and can no longer answer.
#[derive(Debug, Error)]
#[error("coordinator unavailable")]
pub struct CoordinatorClosed;

/// Cheap, cloneable front door to the coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorCommand>,
    positions: PositionBoard,
}

impl CoordinatorHandle {
    /// Apply a client action and wait for the outgoing reply.
    pub async fn submit_action(&self, action: ClientAction) -> Result<Reply, CoordinatorClosed> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CoordinatorCommand::Action {
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CoordinatorClosed)?;
        reply_rx.await.map_err(|_| CoordinatorClosed)
    }

    /// Cancel a client's dialog or waiting job.
    pub async fn cancel(&self, client_id: ClientId) -> Result<Reply, CoordinatorClosed> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CoordinatorCommand::Cancel {
                client_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CoordinatorClosed)?;
        reply_rx.await.map_err(|_| CoordinatorClosed)
    }

    /// Current 1-based queue position, if the client is waiting. Read
    /// lock-free off the shared board; no coordinator round trip.
    pub fn queue_position(&self, client_id: &ClientId) -> Option<usize> {
        self.positions.get(client_id)
    }

    /// Sender for wiring the worker pool's lifecycle events.
    pub fn sender(&self) -> mpsc::Sender<CoordinatorCommand> {
        self.tx.clone()
    }
}

/// Single-writer owner of sessions and queue positions.
pub struct Coordinator<Q> {
    machine: StateMachine<Q>,
    sessions: SessionStore,
    positions: PositionBoard,
    queue: Arc<AdmissionQueue>,
    rx: mpsc::Receiver<CoordinatorCommand>,
}

impl<Q: QuestionGenerator> Coordinator<Q> {
    pub fn new(questions: Arc<Q>, queue: Arc<AdmissionQueue>) -> (Self, CoordinatorHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let positions = PositionBoard::new();
        let handle = CoordinatorHandle {
            tx,
            positions: positions.clone(),
        };
        let coordinator = Self {
            machine: StateMachine::new(questions),
            sessions: SessionStore::new(),
            positions,
            queue,
            rx,
        };
        (coordinator, handle)
    }

    /// Run until every handle and pool sender is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            self.handle(command).await;
        }
        tracing::debug!("coordinator stopped");
    }

    async fn handle(&mut self, command: CoordinatorCommand) {
        match command {
            CoordinatorCommand::Action { action, reply } => {
                let out = self.handle_action(action).await;
                let _ = reply.send(out);
            }
            CoordinatorCommand::Cancel { client_id, reply } => {
                let out = self.handle_cancel(&client_id);
                let _ = reply.send(out);
            }
            CoordinatorCommand::JobStarted { client_id } => {
                self.positions.job_started(&client_id);
            }
            CoordinatorCommand::JobFinished { client_id, outcome } => {
                self.handle_finished(&client_id, outcome);
            }
        }
    }

    async fn handle_action(&mut self, action: ClientAction) -> Reply {
        let client_id = action.client_id().clone();
        let session = self.sessions.take(&client_id);

        match self.machine.apply(session, action).await {
            Applied::Continue { session, reply } | Applied::Ignored { session, reply } => {
                self.sessions.upsert(session);
                reply
            }
            Applied::Rejected {
                session,
                error,
                reply,
            } => {
                tracing::debug!(client_id = %client_id, error = %error, "action rejected");
                if let Some(session) = session {
                    self.sessions.upsert(session);
                }
                reply
            }
            Applied::ReadyToSubmit {
                session,
                status_handle,
            } => self.submit(session, status_handle),
        }
    }

    /// Snapshot the finished dialog into a job and try to admit it. On
    /// rejection the session survives untouched so the client can retry
    /// the final step without redoing the dialog.
    fn submit(&mut self, mut session: Session, status_handle: Option<StatusHandle>) -> Reply {
        let configuration = match session.finalize() {
            Ok(configuration) => configuration,
            Err(err) => {
                tracing::warn!(
                    client_id = %session.client_id,
                    error = %err,
                    "session incomplete at submission, resetting"
                );
                // The session was taken from the store and is dropped here.
                return prompts::session_reset_reply();
            }
        };

        let job = Job::new(session.client_id.clone(), configuration, status_handle);
        match self.queue.enqueue(job) {
            Ok(position) => {
                session.state = DialogState::InQueue;
                self.positions.insert(session.client_id.clone(), position);
                tracing::info!(
                    client_id = %session.client_id,
                    position,
                    "job admitted"
                );
                self.sessions.upsert(session);
                prompts::queued_reply(position)
            }
            Err(AdmissionError::QueueFull { capacity }) => {
                tracing::warn!(
                    client_id = %session.client_id,
                    capacity,
                    "admission queue full, submission refused"
                );
                self.sessions.upsert(session);
                prompts::queue_full_reply()
            }
        }
    }

    fn handle_cancel(&mut self, client_id: &ClientId) -> Reply {
        let state = match self.sessions.get(client_id) {
            Some(session) => session.state,
            None => return prompts::nothing_to_cancel_reply(),
        };

        if state != DialogState::InQueue {
            self.sessions.delete(client_id);
            self.positions.remove(client_id);
            tracing::info!(client_id = %client_id, "dialog cancelled");
            return prompts::cancelled_reply();
        }

        // Submitted: evict if the job is still waiting; once it has been
        // dequeued the generation runs to completion regardless.
        match self.queue.evict(client_id) {
            Some(position) => {
                self.sessions.delete(client_id);
                self.positions.remove(client_id);
                self.positions.evicted(position);
                tracing::info!(client_id = %client_id, position, "waiting job evicted");
                prompts::cancelled_reply()
            }
            None => prompts::already_running_reply(),
        }
    }

    /// Unconditional cleanup for a completed job: session and position
    /// entries are gone whatever the outcome was.
    fn handle_finished(&mut self, client_id: &ClientId, outcome: JobOutcome) {
        self.sessions.delete(client_id);
        self.positions.remove(client_id);
        match outcome {
            JobOutcome::Delivered => {
                tracing::info!(client_id = %client_id, "job delivered, session cleaned up");
            }
            JobOutcome::Failed => {
                tracing::warn!(client_id = %client_id, "job failed, session cleaned up");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use scrivener_types::catalog::Language;
    use scrivener_types::error::QuestionError;

    struct NoQuestions;

    impl QuestionGenerator for NoQuestions {
        async fn ask(&self, _topic: &str, _language: Language) -> Result<Vec<String>, QuestionError> {
            Err(QuestionError::Upstream("offline".to_string()))
        }
    }

    fn text_action(client: &str, text: &str) -> ClientAction {
        ClientAction::FreeText {
            client_id: ClientId::from(client),
            text: text.to_string(),
        }
    }

    fn choice_action(client: &str, choice_id: &str, state: DialogState) -> ClientAction {
        ClientAction::Choice {
            client_id: ClientId::from(client),
            choice_id: choice_id.to_string(),
            expected_state: state,
            status_handle: None,
        }
    }

    fn coordinator(capacity: usize) -> (Coordinator<NoQuestions>, CoordinatorHandle) {
        Coordinator::new(Arc::new(NoQuestions), Arc::new(AdmissionQueue::new(capacity)))
    }

    /// Drive a client through the shortest complete dialog (question
    /// generator offline, template style, no comparison) up to but not
    /// including the submitting action.
    async fn walk_to_submission(coordinator: &mut Coordinator<NoQuestions>, client: &str) {
        let steps: Vec<ClientAction> = vec![
            text_action(client, "Solar power"),
            choice_action(client, "english", DialogState::ChoosingLanguage),
            choice_action(client, "short", DialogState::ChoosingDepth),
            choice_action(client, "template", DialogState::ChoosingStyleMode),
            choice_action(client, "classic", DialogState::ChoosingTemplate),
            choice_action(client, "pdf", DialogState::ChoosingFormat),
        ];
        for action in steps {
            coordinator.handle_action(action).await;
        }
    }

    async fn submit(coordinator: &mut Coordinator<NoQuestions>, client: &str) -> Reply {
        coordinator
            .handle_action(choice_action(client, "no", DialogState::AskingComparison))
            .await
    }

    #[tokio::test]
    async fn test_submission_enqueues_with_position() {
        let (mut coordinator, handle) = coordinator(10);
        walk_to_submission(&mut coordinator, "a").await;
        let reply = submit(&mut coordinator, "a").await;

        assert!(reply.text.contains("number 1"));
        assert_eq!(handle.queue_position(&ClientId::from("a")), Some(1));
        assert_eq!(coordinator.queue.len(), 1);
        assert_eq!(
            coordinator
                .sessions
                .get(&ClientId::from("a"))
                .unwrap()
                .state,
            DialogState::InQueue
        );
    }

    #[tokio::test]
    async fn test_queue_full_preserves_session() {
        let (mut coordinator, handle) = coordinator(1);
        walk_to_submission(&mut coordinator, "a").await;
        submit(&mut coordinator, "a").await;

        walk_to_submission(&mut coordinator, "b").await;
        let reply = submit(&mut coordinator, "b").await;
        assert!(reply.text.contains("queue is full"));
        assert!(handle.queue_position(&ClientId::from("b")).is_none());

        // Session b is intact at the comparison step; the same action can
        // be retried after the queue drains.
        let session = coordinator.sessions.get(&ClientId::from("b")).unwrap();
        assert_eq!(session.state, DialogState::AskingComparison);

        coordinator.queue.dequeue().await.unwrap();
        let reply = submit(&mut coordinator, "b").await;
        assert!(reply.text.contains("number 1"));
    }

    #[tokio::test]
    async fn test_snapshot_isolation_from_later_activity() {
        let (mut coordinator, _handle) = coordinator(10);
        walk_to_submission(&mut coordinator, "a").await;
        submit(&mut coordinator, "a").await;

        // Simulate the job finishing (which deletes the session), then the
        // client immediately starting a new dialog with a different topic.
        let job = coordinator.queue.dequeue().await.unwrap();
        assert_eq!(job.configuration.topic, "Solar power");

        coordinator.handle_finished(&ClientId::from("a"), JobOutcome::Delivered);
        coordinator
            .handle_action(text_action("a", "Wind power"))
            .await;

        // The captured configuration is untouched by the new session.
        assert_eq!(job.configuration.topic, "Solar power");
        assert_eq!(
            coordinator.sessions.get(&ClientId::from("a")).unwrap().topic,
            "Wind power"
        );
    }

    #[tokio::test]
    async fn test_job_started_shifts_positions() {
        let (mut coordinator, handle) = coordinator(10);
        for client in ["a", "b", "c"] {
            walk_to_submission(&mut coordinator, client).await;
            submit(&mut coordinator, client).await;
        }
        assert_eq!(handle.queue_position(&ClientId::from("c")), Some(3));

        coordinator
            .handle(CoordinatorCommand::JobStarted {
                client_id: ClientId::from("a"),
            })
            .await;

        assert!(handle.queue_position(&ClientId::from("a")).is_none());
        assert_eq!(handle.queue_position(&ClientId::from("b")), Some(1));
        assert_eq!(handle.queue_position(&ClientId::from("c")), Some(2));
    }

    #[tokio::test]
    async fn test_finish_cleans_up_both_maps() {
        let (mut coordinator, handle) = coordinator(10);
        walk_to_submission(&mut coordinator, "a").await;
        submit(&mut coordinator, "a").await;

        coordinator.handle_finished(&ClientId::from("a"), JobOutcome::Failed);

        assert!(coordinator.sessions.get(&ClientId::from("a")).is_none());
        assert!(handle.queue_position(&ClientId::from("a")).is_none());

        // The next action starts from scratch.
        let reply = coordinator
            .handle_action(choice_action("a", "pdf", DialogState::ChoosingFormat))
            .await;
        assert!(reply.text.contains("no active request"));
    }

    #[tokio::test]
    async fn test_cancel_before_submission() {
        let (mut coordinator, _handle) = coordinator(10);
        walk_to_submission(&mut coordinator, "a").await;

        let reply = coordinator.handle_cancel(&ClientId::from("a"));
        assert!(reply.text.contains("cancelled"));
        assert!(coordinator.sessions.get(&ClientId::from("a")).is_none());

        let reply = coordinator.handle_cancel(&ClientId::from("a"));
        assert!(reply.text.contains("nothing to cancel"));
    }

    #[tokio::test]
    async fn test_cancel_waiting_job_evicts_and_shifts_positions() {
        let (mut coordinator, handle) = coordinator(10);
        for client in ["a", "b", "c"] {
            walk_to_submission(&mut coordinator, client).await;
            submit(&mut coordinator, client).await;
        }

        let reply = coordinator.handle_cancel(&ClientId::from("b"));
        assert!(reply.text.contains("cancelled"));
        assert!(coordinator.sessions.get(&ClientId::from("b")).is_none());
        assert_eq!(handle.queue_position(&ClientId::from("a")), Some(1));
        assert_eq!(handle.queue_position(&ClientId::from("c")), Some(2));

        // Dequeue order skips the evicted job.
        assert_eq!(
            coordinator.queue.dequeue().await.unwrap().client_id.as_str(),
            "a"
        );
        assert_eq!(
            coordinator.queue.dequeue().await.unwrap().client_id.as_str(),
            "c"
        );
    }

    #[tokio::test]
    async fn test_cancel_after_dequeue_is_noop() {
        let (mut coordinator, _handle) = coordinator(10);
        walk_to_submission(&mut coordinator, "a").await;
        submit(&mut coordinator, "a").await;

        // The pool has already taken the job.
        coordinator.queue.dequeue().await.unwrap();

        let reply = coordinator.handle_cancel(&ClientId::from("a"));
        assert!(reply.text.contains("no longer be cancelled"));
        // The session survives until the running job finishes.
        assert!(coordinator.sessions.get(&ClientId::from("a")).is_some());
    }

    #[tokio::test]
    async fn test_full_pipeline_delivers_and_cleans_up() {
        use std::time::Duration;

        use parking_lot::Mutex;
        use tokio_util::sync::CancellationToken;

        use scrivener_types::error::{DeliveryError, GenerationError};
        use scrivener_types::job::{GeneratedReport, ReportConfiguration, StatusHandle};

        use crate::collaborator::{Notifier, ReportGenerator};
        use crate::pool::WorkerPool;

        struct InstantGenerator;

        impl ReportGenerator for InstantGenerator {
            async fn generate(
                &self,
                configuration: &ReportConfiguration,
            ) -> Result<GeneratedReport, GenerationError> {
                Ok(GeneratedReport {
                    title: configuration.topic.clone(),
                    artifact: vec![1, 2, 3],
                    format: configuration.format,
                })
            }
        }

        #[derive(Default)]
        struct CollectingNotifier {
            delivered: Mutex<Vec<String>>,
        }

        impl Notifier for CollectingNotifier {
            async fn send_result(
                &self,
                client_id: &ClientId,
                _report: &GeneratedReport,
                _status_handle: Option<&StatusHandle>,
            ) -> Result<(), DeliveryError> {
                self.delivered.lock().push(client_id.to_string());
                Ok(())
            }

            async fn send_error(
                &self,
                _client_id: &ClientId,
                _message: &str,
                _status_handle: Option<&StatusHandle>,
            ) -> Result<(), DeliveryError> {
                Ok(())
            }
        }

        let queue = Arc::new(AdmissionQueue::new(10));
        let (coordinator, handle) = Coordinator::new(Arc::new(NoQuestions), Arc::clone(&queue));
        tokio::spawn(coordinator.run());

        let notifier = Arc::new(CollectingNotifier::default());
        let shutdown = CancellationToken::new();
        let pool = WorkerPool::new(
            queue,
            2,
            Arc::new(InstantGenerator),
            Arc::clone(&notifier),
            handle.sender(),
            shutdown.clone(),
        );
        tokio::spawn(pool.run());

        // Full dialog for one client.
        let steps: Vec<ClientAction> = vec![
            text_action("a", "Solar power"),
            choice_action("a", "english", DialogState::ChoosingLanguage),
            choice_action("a", "short", DialogState::ChoosingDepth),
            choice_action("a", "template", DialogState::ChoosingStyleMode),
            choice_action("a", "classic", DialogState::ChoosingTemplate),
            choice_action("a", "pdf", DialogState::ChoosingFormat),
        ];
        for action in steps {
            handle.submit_action(action).await.unwrap();
        }
        let reply = handle
            .submit_action(choice_action("a", "no", DialogState::AskingComparison))
            .await
            .unwrap();
        assert!(reply.text.contains("queue"));

        // Wait for delivery.
        let mut waited = 0;
        while notifier.delivered.lock().is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += 1;
            assert!(waited < 250, "report never delivered");
        }
        assert_eq!(notifier.delivered.lock().as_slice(), ["a"]);

        // Cleanup is total: the position entry disappears and the session
        // is gone, so a follow-up choice is met with "start over".
        let mut waited = 0;
        loop {
            let reply = handle
                .submit_action(choice_action("a", "pdf", DialogState::ChoosingFormat))
                .await
                .unwrap();
            if reply.text.contains("no active request") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += 1;
            assert!(waited < 250, "session was never cleaned up");
        }
        assert!(handle.queue_position(&ClientId::from("a")).is_none());

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_two_slots_three_clients() {
        use std::time::Duration;

        use tokio_util::sync::CancellationToken;

        use scrivener_types::error::{DeliveryError, GenerationError};
        use scrivener_types::job::{GeneratedReport, ReportConfiguration, StatusHandle};

        use crate::collaborator::{Notifier, ReportGenerator};
        use crate::pool::WorkerPool;

        struct SlowGenerator;

        impl ReportGenerator for SlowGenerator {
            async fn generate(
                &self,
                configuration: &ReportConfiguration,
            ) -> Result<GeneratedReport, GenerationError> {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Ok(GeneratedReport {
                    title: configuration.topic.clone(),
                    artifact: vec![1],
                    format: configuration.format,
                })
            }
        }

        struct SilentNotifier;

        impl Notifier for SilentNotifier {
            async fn send_result(
                &self,
                _client_id: &ClientId,
                _report: &GeneratedReport,
                _status_handle: Option<&StatusHandle>,
            ) -> Result<(), DeliveryError> {
                Ok(())
            }

            async fn send_error(
                &self,
                _client_id: &ClientId,
                _message: &str,
                _status_handle: Option<&StatusHandle>,
            ) -> Result<(), DeliveryError> {
                Ok(())
            }
        }

        async fn drive_dialog(handle: &CoordinatorHandle, client: &str) {
            let steps: Vec<ClientAction> = vec![
                text_action(client, "Solar power"),
                choice_action(client, "english", DialogState::ChoosingLanguage),
                choice_action(client, "short", DialogState::ChoosingDepth),
                choice_action(client, "template", DialogState::ChoosingStyleMode),
                choice_action(client, "classic", DialogState::ChoosingTemplate),
                choice_action(client, "pdf", DialogState::ChoosingFormat),
                choice_action(client, "no", DialogState::AskingComparison),
            ];
            for action in steps {
                handle.submit_action(action).await.unwrap();
            }
        }

        async fn poll_until(mut check: impl FnMut() -> bool, what: &str) {
            for _ in 0..250 {
                if check() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("timed out waiting for: {what}");
        }

        let queue = Arc::new(AdmissionQueue::new(10));
        let (coordinator, handle) = Coordinator::new(Arc::new(NoQuestions), Arc::clone(&queue));
        tokio::spawn(coordinator.run());

        let shutdown = CancellationToken::new();
        let pool = WorkerPool::new(
            queue,
            2,
            Arc::new(SlowGenerator),
            Arc::new(SilentNotifier),
            handle.sender(),
            shutdown.clone(),
        );
        tokio::spawn(pool.run());

        for client in ["a", "b", "c"] {
            drive_dialog(&handle, client).await;
        }

        // A and B take the two slots (positions cleared); C waits at 1.
        let h = handle.clone();
        poll_until(
            move || {
                h.queue_position(&ClientId::from("a")).is_none()
                    && h.queue_position(&ClientId::from("b")).is_none()
                    && h.queue_position(&ClientId::from("c")) == Some(1)
            },
            "A and B dispatched with C waiting at position 1",
        )
        .await;

        // When a slot frees up, C is dispatched and its position removed.
        let h = handle.clone();
        poll_until(
            move || h.queue_position(&ClientId::from("c")).is_none(),
            "C dispatched after a slot freed",
        )
        .await;

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_handle_round_trip_through_channel() {
        let (coordinator, handle) = coordinator(10);
        let task = tokio::spawn(coordinator.run());

        let reply = handle
            .submit_action(text_action("a", "Solar power"))
            .await
            .unwrap();
        assert!(reply.text.contains("Which language"));

        let reply = handle.cancel(ClientId::from("a")).await.unwrap();
        assert!(reply.text.contains("cancelled"));

        drop(handle);
        task.await.unwrap();
    }
}
