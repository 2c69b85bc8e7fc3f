//! Bounded-concurrency job execution.

pub mod dispatcher;

pub use dispatcher::WorkerPool;
