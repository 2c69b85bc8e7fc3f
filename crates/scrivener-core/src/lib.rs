//! Coordination core for Scrivener.
//!
//! This crate owns the job admission and execution machinery: the dialog
//! state machine, the single-writer session store, the FIFO admission
//! queue with live position tracking, the bounded-concurrency worker
//! pool, and the coordinator loop that ties them together. It also
//! defines the collaborator ports (report generation, clarification
//! questions, result delivery) that `scrivener-infra` implements -- this
//! crate never depends on any HTTP or IO machinery itself.

pub mod collaborator;
pub mod coordinator;
pub mod dialog;
pub mod pool;
pub mod queue;
pub mod session;
