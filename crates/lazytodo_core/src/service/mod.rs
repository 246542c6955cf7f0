//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the task collection, its adapters and its derived views.
//! - Keep presentation layers decoupled from storage and platform details.

pub mod task_store;
pub mod task_view;
