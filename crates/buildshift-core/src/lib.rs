//! # buildshift-core
//!
//! Core types, errors, and utilities for the BuildShift dashboard.
//!
//! This crate provides:
//! - [`BuildShiftError`] - Error types for all dashboard operations
//! - [`logging`] - Tracing setup and log management utilities
//! - [`types`] - Shared type definitions used across BuildShift crates
//! - [`config`] - Dashboard configuration loading
//!
//! ## Example
//!
//! ```no_run
//! use buildshift_core::{BuildShiftError, Result, logging};
//!
//! fn main() -> buildshift_core::Result<()> {
//!     // Initialize logging
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     // Use BuildShift errors
//!     let config_path = std::path::Path::new("~/.buildshift/config.yaml");
//!     if !config_path.exists() {
//!         return Err(BuildShiftError::config_not_found(config_path));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::{BuildShiftError, Result};
pub use logging::{LogGuard, init_logging};
pub use types::{
    LeaderboardEntry, Machine, Person, SessionSample, Task, TaskStatus, Timestamp,
};
