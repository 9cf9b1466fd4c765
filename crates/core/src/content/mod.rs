//! Content attachment reconciliation.
//!
//! A parent record (news item, article, pet, transaction) owns attachments in
//! one or more slots. The admin UI submits the full desired descriptor list
//! per slot; [`AttachmentReconciler`] deletes what is no longer referenced,
//! uploads what is new, and keeps storage and attachment tables in step.

pub mod descriptor;
mod error;
mod inline;
mod preview;
mod registry;
mod repository;
mod service;
mod slot;
mod types;


pub use descriptor::{DescriptorKind, classify, document_url, object_key, partition};
pub use error::ContentError;
pub use inline::InlinePayload;
pub use preview::{PreviewResolver, ViewerPreviewResolver};
pub use registry::ContentRegistry;
pub use repository::{ContentRepository, ContentRow, RepositoryFactory, UnitOfWork};
pub use service::{AttachmentPayload, AttachmentReconciler};
pub use slot::{AttachmentSlotConfig, FieldMap, FieldValue};
pub use types::{AttachmentReport, SlotReport};
