//! Domain model for the task list.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep category labels closed and normalized at creation time.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard removal from the collection.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod settings;
pub mod task;
