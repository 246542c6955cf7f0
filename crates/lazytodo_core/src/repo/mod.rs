//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define load/save contracts for the task collection and settings.
//! - Isolate SQLite and JSON encoding details from `TaskStore`.
//!
//! # Invariants
//! - Repositories report failures; they never silently substitute defaults.
//!   Degrading to an empty collection is a service-layer decision.

pub mod task_repo;
