//! Persistence traits consumed by the reconciler.
//!
//! These traits are implemented by the db crate to provide actual database
//! operations.

use std::future::Future;

use haven_shared::ContentRowId;

use super::error::ContentError;
use super::slot::{FieldMap, FieldValue};

/// A persisted attachment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow {
    /// Primary key.
    pub id: ContentRowId,
    /// Every other column of the row.
    pub fields: FieldMap,
}

impl ContentRow {
    /// Value of a column.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

/// Filtered access to the rows of one attachment table.
pub trait ContentRepository: Send + Sync {
    /// Rows matching every filter, in insertion order.
    fn find_filtered(
        &self,
        filters: &FieldMap,
    ) -> impl Future<Output = Result<Vec<ContentRow>, ContentError>> + Send;

    /// Insert a row with the given columns.
    fn add_one(
        &self,
        fields: &FieldMap,
    ) -> impl Future<Output = Result<ContentRow, ContentError>> + Send;

    /// Delete rows matching every filter; returns the number removed.
    fn delete_filtered(
        &self,
        filters: &FieldMap,
    ) -> impl Future<Output = Result<u64, ContentError>> + Send;
}

/// Builds a [`ContentRepository`] bound to a persistence session.
pub trait RepositoryFactory<S>: Send + Sync {
    /// Repository type produced for a borrowed session.
    type Repository<'s>: ContentRepository
    where
        Self: 's,
        S: 's;

    /// Bind a repository to `session`.
    fn bind<'s>(&'s self, session: &'s S) -> Self::Repository<'s>;
}

/// Session factory: every reconciler operation runs inside sessions it opens
/// here and either commits or rolls back.
pub trait UnitOfWork: Send + Sync {
    /// An open transaction.
    type Session: Send + Sync;

    /// Open a session.
    fn begin(&self) -> impl Future<Output = Result<Self::Session, ContentError>> + Send;

    /// Commit and release a session.
    fn commit(
        &self,
        session: Self::Session,
    ) -> impl Future<Output = Result<(), ContentError>> + Send;

    /// Roll back and release a session.
    fn rollback(
        &self,
        session: Self::Session,
    ) -> impl Future<Output = Result<(), ContentError>> + Send;
}
