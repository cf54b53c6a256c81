// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The stage handler contract (§6.2).
//!
//! A handler is injected by a surrounding bootstrap; the core never
//! constructs one. Grounded on `AgentAdapter`
//! (`crates/adapters/src/agent/mod.rs`): a `Clone + Send + Sync + 'static`
//! `#[async_trait]` trait with a real implementation out of scope and a
//! fake implementation in scope for tests.

use async_trait::async_trait;
use spindle_core::{ClassifiedError, Item};
use tokio_util::sync::CancellationToken;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStageHandler, PrepareOutcome};

/// A non-blocking dependency probe (§6.2 `HealthCheck`).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HealthCheck {
    pub ready: bool,
    pub name: String,
    pub detail: String,
}

impl HealthCheck {
    pub fn ready(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            ready: true,
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn not_ready(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            ready: false,
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// The outcome of [`StageHandler::execute`]: either a classified failure or
/// a cancellation. Kept distinct from a bare `ClassifiedError` so the
/// manager can tell "shutdown in progress" (§4.2.3 step 7, not a failure)
/// from "the stage actually failed" (step 8, classify and record) without
/// string-sniffing an error message.
#[derive(Debug, Clone)]
pub enum StageError {
    /// `ctx` was cancelled (daemon shutdown or lane stop) while the handler
    /// was still running. Not recorded as a failure.
    Cancelled,
    /// A structured failure (§7 taxonomy).
    Classified(ClassifiedError),
}

impl From<ClassifiedError> for StageError {
    fn from(err: ClassifiedError) -> Self {
        StageError::Classified(err)
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::Cancelled => write!(f, "cancelled"),
            StageError::Classified(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StageError {}

/// Uniform capability set every stage implementation presents (§6.2).
///
/// Modeled as a trait rather than inheritance, per §9 "Polymorphism over
/// handlers": a `StageSet` struct of optional `Arc<dyn StageHandler>`
/// references is the registration surface (§6.3).
#[async_trait]
pub trait StageHandler: Send + Sync + 'static {
    /// Synchronous, short. Resets progress fields, validates inputs,
    /// records the stage label. May return a classified error
    /// (validation/configuration).
    async fn prepare(&self, item: &mut Item) -> Result<(), ClassifiedError>;

    /// Synchronous, long-running. Performs the external work. Must honor
    /// `ctx` cancellation. May mutate any item field except `id`,
    /// `created_at`, `status` (unless it explicitly advances to a terminal
    /// state like `completed`), and `last_heartbeat`.
    async fn execute(&self, item: &mut Item, ctx: CancellationToken) -> Result<(), StageError>;

    /// Non-blocking dependency probe.
    async fn health_check(&self) -> HealthCheck;

    /// Optional hook: honored if the handler exposes it, so the manager
    /// can inject a per-item or per-lane logger. Default is a no-op, since
    /// most handlers are content with the ambient `tracing` span the
    /// manager already attaches around `process_item` (§4.2.3 step 1).
    fn set_logger(&self, _span: tracing::Span) {}
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
