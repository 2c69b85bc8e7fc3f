//! Bounded FIFO admission queue.
//!
//! Insertion order is the sole ordering key; there is no priority. The
//! queue is bounded by `capacity` (0 = unbounded) and rejects submissions
//! once full rather than applying backpressure to the dialog.
//!
//! Cancellation of a waiting job must not race the dispatcher, so
//! eviction leaves a tombstone (`None` slot) in place of the job instead
//! of removing the slot: the permit counter and the slot deque always
//! agree, and the dispatcher simply skips tombstones when it dequeues.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use scrivener_types::error::AdmissionError;
use scrivener_types::job::Job;
use scrivener_types::session::ClientId;

/// FIFO holding area for jobs awaiting a concurrency slot.
#[derive(Debug)]
pub struct AdmissionQueue {
    /// Slots in admission order. `None` marks an evicted job whose permit
    /// has not been consumed yet.
    slots: Mutex<VecDeque<Option<Job>>>,
    /// One permit per slot (tombstones included).
    ready: Semaphore,
    /// Maximum number of live (non-evicted) waiting jobs; 0 = unbounded.
    capacity: usize,
}

impl AdmissionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(VecDeque::new()),
            ready: Semaphore::new(0),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live jobs currently waiting.
    pub fn len(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Admit a job. Returns the job's 1-based queue position (live length
    /// after insertion), or rejects when the queue is at capacity.
    pub fn enqueue(&self, job: Job) -> Result<usize, AdmissionError> {
        let mut slots = self.slots.lock();
        let live = slots.iter().filter(|s| s.is_some()).count();
        if self.capacity > 0 && live >= self.capacity {
            return Err(AdmissionError::QueueFull {
                capacity: self.capacity,
            });
        }
        slots.push_back(Some(job));
        self.ready.add_permits(1);
        Ok(live + 1)
    }

    /// Wait for the next job in admission order. Returns `None` once the
    /// queue has been closed and drained of live jobs.
    pub async fn dequeue(&self) -> Option<Job> {
        loop {
            match self.ready.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return None,
            }
            // A permit guarantees a slot; tombstones consume their permit
            // and the loop moves on to the next slot.
            if let Some(job) = self.slots.lock().pop_front().flatten() {
                return Some(job);
            }
        }
    }

    /// Evict a waiting job by client, leaving a tombstone. Returns the
    /// evicted job's 1-based live position, or `None` if no job for that
    /// client is waiting (it was already dequeued or never admitted).
    pub fn evict(&self, client_id: &ClientId) -> Option<usize> {
        let mut slots = self.slots.lock();
        let mut live_position = 0;
        for slot in slots.iter_mut() {
            let Some(job) = slot else { continue };
            live_position += 1;
            if job.client_id == *client_id {
                *slot = None;
                return Some(live_position);
            }
        }
        None
    }

    /// Stop accepting dequeues; pending and future `dequeue` calls return
    /// `None`. Enqueued jobs are dropped with the queue.
    pub fn close(&self) {
        self.ready.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use scrivener_types::catalog::{Depth, Language, OutputFormat, TemplateId};
    use scrivener_types::job::{ReportConfiguration, VisualStyle};

    fn job_for(client: &str) -> Job {
        Job::new(
            ClientId::from(client),
            ReportConfiguration {
                topic: "Topic".to_string(),
                title: None,
                answers: vec![],
                language: Language::English,
                depth: Depth::Short,
                style: VisualStyle::Template {
                    template: TemplateId::Classic,
                },
                format: OutputFormat::Pdf,
                comparison: None,
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = AdmissionQueue::new(0);
        assert_eq!(queue.enqueue(job_for("a")).unwrap(), 1);
        assert_eq!(queue.enqueue(job_for("b")).unwrap(), 2);
        assert_eq!(queue.enqueue(job_for("c")).unwrap(), 3);

        assert_eq!(queue.dequeue().await.unwrap().client_id.as_str(), "a");
        assert_eq!(queue.dequeue().await.unwrap().client_id.as_str(), "b");
        assert_eq!(queue.dequeue().await.unwrap().client_id.as_str(), "c");
    }

    #[tokio::test]
    async fn test_queue_full_rejects() {
        let queue = AdmissionQueue::new(1);
        assert_eq!(queue.enqueue(job_for("a")).unwrap(), 1);
        let err = queue.enqueue(job_for("b")).unwrap_err();
        assert_eq!(err, AdmissionError::QueueFull { capacity: 1 });

        // A dequeue frees the slot.
        queue.dequeue().await.unwrap();
        assert_eq!(queue.enqueue(job_for("b")).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_unbounded() {
        let queue = AdmissionQueue::new(0);
        for i in 0..100 {
            assert_eq!(queue.enqueue(job_for(&format!("c{i}"))).unwrap(), i + 1);
        }
        assert_eq!(queue.len(), 100);
    }

    #[tokio::test]
    async fn test_evict_leaves_tombstone_and_dequeue_skips_it() {
        let queue = AdmissionQueue::new(0);
        queue.enqueue(job_for("a")).unwrap();
        queue.enqueue(job_for("b")).unwrap();
        queue.enqueue(job_for("c")).unwrap();

        assert_eq!(queue.evict(&ClientId::from("b")), Some(2));
        assert_eq!(queue.len(), 2);
        // Evicting again finds nothing.
        assert_eq!(queue.evict(&ClientId::from("b")), None);

        assert_eq!(queue.dequeue().await.unwrap().client_id.as_str(), "a");
        assert_eq!(queue.dequeue().await.unwrap().client_id.as_str(), "c");
    }

    #[tokio::test]
    async fn test_evict_frees_capacity() {
        let queue = AdmissionQueue::new(2);
        queue.enqueue(job_for("a")).unwrap();
        queue.enqueue(job_for("b")).unwrap();
        assert!(queue.enqueue(job_for("c")).is_err());

        queue.evict(&ClientId::from("a")).unwrap();
        assert_eq!(queue.enqueue(job_for("c")).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dequeue_blocks_until_enqueue() {
        use std::sync::Arc;

        let queue = Arc::new(AdmissionQueue::new(0));
        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.dequeue().await })
        };

        // Give the waiter a chance to park on the semaphore.
        tokio::task::yield_now().await;
        queue.enqueue(job_for("late")).unwrap();

        let job = waiter.await.unwrap().unwrap();
        assert_eq!(job.client_id.as_str(), "late");
    }

    #[tokio::test]
    async fn test_close_unblocks_dequeue() {
        let queue = AdmissionQueue::new(0);
        queue.close();
        assert!(queue.dequeue().await.is_none());
    }
}
