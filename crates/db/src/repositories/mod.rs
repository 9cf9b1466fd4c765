//! Repository implementations for data access.
//!
//! Repositories implement the persistence traits declared in `haven-core`.

pub mod content;

pub use content::{SeaContentRepository, SeaRepositoryFactory};
