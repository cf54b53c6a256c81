// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The classified error taxonomy (§7 of the core specification).
//!
//! Stage handlers are expected to report failures through this type rather
//! than an opaque string, so the manager can tell a data problem from an
//! operator mistake from a transient hiccup.

use std::fmt;
use thiserror::Error;

/// The five-way failure taxonomy. Each kind maps to a distinct retry policy
/// at the operator/caller level, even though all five currently produce the
/// same `status := failed` transition inside the manager (§4.2.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input to this stage is semantically wrong. Not retriable without
    /// a data change (e.g. a missing rip spec).
    Validation,
    /// An operator mistake, such as an unset binary path. Not retriable
    /// without a config change.
    Configuration,
    /// A spawned external process failed. Possibly retriable manually.
    ExternalTool,
    /// An I/O hiccup or database contention that exhausted its retries.
    Transient,
    /// A programmer error; report prominently.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::ExternalTool => "external_tool",
            ErrorKind::Transient => "transient",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

/// A structured failure reported by a stage handler.
///
/// `operation` names the sub-step that failed (e.g. `"mount_disc"`),
/// `message` is the user-visible reason, and `hint` (when present) is
/// surfaced as both `progress_message` and `review_reason` by the manager.
#[derive(Debug, Clone, Error)]
#[error("{operation}: {message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub operation: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation: operation.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn validation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, operation, message)
    }

    pub fn configuration(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, operation, message)
    }

    pub fn external_tool(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalTool, operation, message)
    }

    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, operation, message)
    }

    pub fn internal(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, operation, message)
    }
}

/// Converts an unclassified external error into the `internal` kind (§4.2.4
/// "unclassified (plain error)"): `operation := "unclassified"`,
/// `message := err.to_string()`. This is the Rust analogue of the spec's
/// "plain error" case, where a caller outside the classified-error
/// vocabulary wraps an arbitrary error into one via `?`/`.into()`.
impl From<Box<dyn std::error::Error + Send + Sync>> for ClassifiedError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ClassifiedError::internal("unclassified", err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
