// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The durable queue store backing Spindle's workflow manager.
//!
//! A single SQLite connection (WAL journaling, 5s busy timeout, app-level
//! retry on top) holds every [`spindle_core::Item`] ever seen by the
//! pipeline. The workflow manager is the only expected writer; readers
//! (a status CLI, a dashboard) can open the same file concurrently.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod error;
mod retry;
mod row;
mod schema;
mod store;

pub use error::StoreError;
pub use schema::SCHEMA_VERSION;
pub use store::{HealthReport, QueueStore, Stats};
