//! Contracts for collaborators that live outside the core.
//!
//! # Responsibility
//! - Define the seams `TaskStore` calls into: text classification,
//!   reminder/badge notifications and wall-clock time.
//! - Ship small first-party implementations usable in tests and tooling.
//!
//! # Invariants
//! - Adapter failures never propagate into `TaskStore` mutations.

pub mod classifier;
pub mod clock;
pub mod notifier;
