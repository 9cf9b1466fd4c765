//! Shared identifiers, errors, and configuration for Haven.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for parent records and attachment rows
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::{ContentRowId, RecordId};
