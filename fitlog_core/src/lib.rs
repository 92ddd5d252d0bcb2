#![forbid(unsafe_code)]

//! Core record store and statistics for the fitlog workout tracker.
//!
//! This crate provides:
//! - Domain types (workout records, validated input, stable ids)
//! - The record store (add, remove, clear, list, persist, reload)
//! - Statistics over a record snapshot
//! - File persistence in delimited or tabular CSV layout
//! - Configuration and logging setup for binaries

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod storage;
pub mod store;
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use storage::{FileStorage, MalformedRowPolicy, RecordStorage, StorageFormat};
pub use store::WorkoutStore;
pub use stats::{compute_stats, WorkoutStats};
