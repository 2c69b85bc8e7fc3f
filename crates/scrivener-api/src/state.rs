//! Application state wiring the coordination core to the HTTP adapters.
//!
//! `AppState` pins the core's generics to the concrete infra
//! implementations, spawns the coordinator and worker-pool tasks, and
//! hands out the cheap cloneable pieces the HTTP handlers need.

use std::sync::Arc;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use scrivener_core::coordinator::{Coordinator, CoordinatorHandle};
use scrivener_core::pool::WorkerPool;
use scrivener_core::queue::AdmissionQueue;
use scrivener_infra::http::{HttpQuestionGenerator, HttpReportGenerator, WebhookNotifier};
use scrivener_types::config::ServiceConfig;

/// Concrete type aliases for the core generics pinned to infra implementations.
pub type ConcreteCoordinator = Coordinator<HttpQuestionGenerator>;
pub type ConcretePool = WorkerPool<HttpReportGenerator, WebhookNotifier>;

/// Shared application state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: CoordinatorHandle,
    pub queue: Arc<AdmissionQueue>,
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the service: admission queue, coordinator loop, worker pool.
    ///
    /// The coordinator and pool tasks run until every handle is dropped or
    /// the shutdown token fires; `shutdown()` stops dispatching new jobs
    /// but lets in-flight generations finish.
    pub fn init(
        config: &ServiceConfig,
        api_key: SecretString,
        webhook_secret: Option<SecretString>,
    ) -> Self {
        let queue = Arc::new(AdmissionQueue::new(config.max_queue_length));

        let questions = Arc::new(HttpQuestionGenerator::new(&config.generator, api_key.clone()));
        let (coordinator, handle): (ConcreteCoordinator, _) =
            Coordinator::new(questions, Arc::clone(&queue));
        tokio::spawn(coordinator.run());

        let generator = Arc::new(HttpReportGenerator::new(&config.generator, api_key));
        let notifier = Arc::new(WebhookNotifier::new(&config.notifier, webhook_secret));
        let shutdown = CancellationToken::new();
        let pool: ConcretePool = WorkerPool::new(
            Arc::clone(&queue),
            config.max_concurrency,
            generator,
            notifier,
            handle.sender(),
            shutdown.clone(),
        );
        tokio::spawn(pool.run());

        Self {
            coordinator: handle,
            queue,
            shutdown,
        }
    }

    /// Stop dispatching new jobs and refuse further dequeues.
    pub fn shutdown(&self) {
        self.queue.close();
        self.shutdown.cancel();
    }
}
