//! Core logic for Haven content attachments.
//!
//! This crate contains the attachment reconciliation engine with ZERO web or
//! database dependencies. Persistence is reached through the traits in
//! [`content`], implemented by the db crate.
//!
//! # Modules
//!
//! - `content` - Slot configuration, descriptor classification and the reconciler
//! - `media` - Image compression to a fixed height
//! - `storage` - Object storage over OpenDAL

pub mod content;
pub mod media;
pub mod storage;
