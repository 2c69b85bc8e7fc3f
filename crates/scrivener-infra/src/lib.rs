//! Infrastructure adapters for Scrivener.
//!
//! Implements the collaborator ports from `scrivener-core` against real
//! HTTP services: report generation, clarification questions, and webhook
//! delivery. The core never sees reqwest, base64, or signing concerns.

pub mod http;
