//! Worker pool: dispatches queued jobs into bounded concurrent execution.
//!
//! The dispatcher acquires a concurrency slot *before* dequeuing, so a job
//! only leaves the queue when it can start immediately -- queue positions
//! stay truthful and jobs start in strict admission order. Up to N jobs
//! run at once; completion order across jobs is whatever it is.
//!
//! Each job runs in its own task, joined by a wrapper task that reports
//! completion to the coordinator and releases the slot on every exit path.
//! A panic inside the job body surfaces as a join error on the wrapper,
//! which still performs the full cleanup.

use std::sync::Arc;

use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use scrivener_types::error::GenerationError;
use scrivener_types::job::{Job, JobOutcome};

use crate::collaborator::{Notifier, ReportGenerator};
use crate::coordinator::CoordinatorCommand;
use crate::queue::AdmissionQueue;

/// Generation attempts per job. Only transient structural failures of the
/// generated content are retried; the final failure goes to the client.
pub const MAX_GENERATION_ATTEMPTS: u32 = 3;

/// Longest diagnostic forwarded to a client on failure.
const DIAGNOSTIC_LIMIT: usize = 200;

/// Fixed-size concurrency gate over the admission queue.
pub struct WorkerPool<G, N> {
    queue: Arc<AdmissionQueue>,
    slots: Arc<Semaphore>,
    generator: Arc<G>,
    notifier: Arc<N>,
    events: mpsc::Sender<CoordinatorCommand>,
    shutdown: CancellationToken,
}

impl<G, N> WorkerPool<G, N>
where
    G: ReportGenerator + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        queue: Arc<AdmissionQueue>,
        max_concurrency: usize,
        generator: Arc<G>,
        notifier: Arc<N>,
        events: mpsc::Sender<CoordinatorCommand>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            queue,
            slots: Arc::new(Semaphore::new(max_concurrency)),
            generator,
            notifier,
            events,
            shutdown,
        }
    }

    /// Dispatch loop. Runs until shutdown is signalled or the queue is
    /// closed. In-flight jobs are left to finish; only dispatch stops.
    pub async fn run(self) {
        loop {
            let permit = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                permit = Arc::clone(&self.slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let job = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                job = self.queue.dequeue() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            tracing::info!(
                client_id = %job.client_id,
                job_id = %job.id,
                "dispatching job"
            );

            if self
                .events
                .send(CoordinatorCommand::JobStarted {
                    client_id: job.client_id.clone(),
                })
                .await
                .is_err()
            {
                // Coordinator gone; nobody is left to clean up after jobs.
                break;
            }

            tokio::spawn(execute(
                job,
                permit,
                Arc::clone(&self.generator),
                Arc::clone(&self.notifier),
                self.events.clone(),
            ));
        }
        tracing::debug!("worker pool dispatcher stopped");
    }
}

/// Wrapper around one job's execution. Joins the job body so that even a
/// panic in generation or delivery code cannot skip the completion report
/// or leak the concurrency slot.
async fn execute<G, N>(
    job: Job,
    permit: OwnedSemaphorePermit,
    generator: Arc<G>,
    notifier: Arc<N>,
    events: mpsc::Sender<CoordinatorCommand>,
) where
    G: ReportGenerator + 'static,
    N: Notifier + 'static,
{
    let client_id = job.client_id.clone();
    let job_id = job.id;

    let outcome = match tokio::spawn(run_job(job, generator, notifier)).await {
        Ok(outcome) => outcome,
        Err(join_err) => {
            tracing::error!(
                client_id = %client_id,
                job_id = %job_id,
                error = %join_err,
                "job task aborted unexpectedly"
            );
            JobOutcome::Failed
        }
    };

    if events
        .send(CoordinatorCommand::JobFinished {
            client_id: client_id.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        tracing::warn!(client_id = %client_id, "coordinator gone, completion not recorded");
    }

    drop(permit);
}

/// One job: generate with retry, deliver, report the outcome.
async fn run_job<G, N>(job: Job, generator: Arc<G>, notifier: Arc<N>) -> JobOutcome
where
    G: ReportGenerator,
    N: Notifier,
{
    let status_handle = job.status_handle.as_ref();

    let mut attempt = 1u32;
    let generated = loop {
        match generator.generate(&job.configuration).await {
            Ok(report) => break Ok(report),
            Err(err) if err.is_transient() && attempt < MAX_GENERATION_ATTEMPTS => {
                tracing::warn!(
                    client_id = %job.client_id,
                    job_id = %job.id,
                    attempt,
                    error = %err,
                    "generation attempt failed, retrying"
                );
                attempt += 1;
            }
            Err(err) => break Err(err),
        }
    };

    match generated {
        Ok(report) => {
            if let Err(err) = notifier
                .send_result(&job.client_id, &report, status_handle)
                .await
            {
                // Best effort: a lost delivery is logged, not a job failure.
                tracing::warn!(
                    client_id = %job.client_id,
                    job_id = %job.id,
                    error = %err,
                    "result delivery failed"
                );
            }
            JobOutcome::Delivered
        }
        Err(err) => {
            tracing::error!(
                client_id = %job.client_id,
                job_id = %job.id,
                attempts = attempt,
                error = %err,
                "generation failed"
            );
            let message = truncated_diagnostic(&err);
            if let Err(delivery_err) = notifier
                .send_error(&job.client_id, &message, status_handle)
                .await
            {
                tracing::warn!(
                    client_id = %job.client_id,
                    job_id = %job.id,
                    error = %delivery_err,
                    "error delivery failed"
                );
            }
            JobOutcome::Failed
        }
    }
}

fn truncated_diagnostic(err: &GenerationError) -> String {
    let full = format!("Report generation failed: {err}");
    if full.chars().count() <= DIAGNOSTIC_LIMIT {
        return full;
    }
    let mut out: String = full.chars().take(DIAGNOSTIC_LIMIT).collect();
    out.push_str("...");
    out
}
