//! Core types and error definitions for the Opsmesh platform.
//!
//! This crate provides the foundational types shared across all Opsmesh
//! crates: the task model, the recommendation model, and the unified error
//! enum.
//!
//! # Main types
//!
//! - [`OpsmeshError`] — Unified error enum for all Opsmesh subsystems.
//! - [`OpsmeshResult`] — Convenience alias for `Result<T, OpsmeshError>`.
//! - [`Task`] — A unit of work with a type, context payload, and lifecycle status.
//! - [`TaskStatus`] / [`TaskPriority`] — The task lifecycle and advisory priority.
//! - [`Recommendation`] — A structured suggestion produced by an agent.

/// Structured agent recommendations.
pub mod recommendation;
/// The task model and its lifecycle.
pub mod task;

pub use recommendation::{Recommendation, RiskLevel};
pub use task::{Task, TaskPriority, TaskStatus};

/// Top-level error type for the Opsmesh platform.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum OpsmeshError {
    /// An error originating from an agent's task or warm-up logic.
    #[error("Agent error: {0}")]
    Agent(String),

    /// An error from the orchestration engine.
    #[error("Orchestrator error: {0}")]
    Orchestrator(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`OpsmeshError`].
pub type OpsmeshResult<T> = Result<T, OpsmeshError>;
