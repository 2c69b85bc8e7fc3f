//! Observability setup for Scrivener.

pub mod tracing_setup;
