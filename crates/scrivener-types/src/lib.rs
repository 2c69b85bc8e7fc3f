//! Shared domain types for Scrivener.
//!
//! This crate contains the core domain types used across the Scrivener
//! service: dialog sessions and their state graph, choice catalogs, job
//! snapshots, client actions, service configuration, and the associated
//! error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod action;
pub mod catalog;
pub mod config;
pub mod error;
pub mod job;
pub mod session;
