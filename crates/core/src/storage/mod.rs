//! Object storage for content attachments using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-process memory (tests only)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         ObjectStore                              │
//! │        upload(bytes, mimetype) / delete_by_name / get_url        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                      Apache OpenDAL                              │
//! │ op.write_with("key", data)  │ op.delete("key")  │ op.stat("key") │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

use std::future::Future;

use bytes::Bytes;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::StorageService;

/// Object store consumed by the attachment reconciler.
///
/// Implemented by [`StorageService`]; tests substitute in-memory fakes.
pub trait ObjectStore: Send + Sync {
    /// Store `data` under a freshly generated key and return that key.
    fn upload(
        &self,
        data: Bytes,
        mimetype: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Delete the object stored under `key`.
    ///
    /// Deleting a key that does not exist succeeds.
    fn delete_by_name(&self, key: &str)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Direct URL under which `key` can be fetched.
    fn get_url(&self, key: &str) -> String;
}
