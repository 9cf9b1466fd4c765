//! Database layer for Haven content attachments.
//!
//! This crate provides:
//! - [`SeaUnitOfWork`], the transaction source for the reconciler
//! - One repository over every attachment table
//! - The attachment slot registry
//! - Database migrations

pub mod migration;
pub mod registry;
pub mod repositories;
pub mod session;
pub mod tables;

pub use registry::content_registry;
pub use repositories::{SeaContentRepository, SeaRepositoryFactory};
pub use session::SeaUnitOfWork;
