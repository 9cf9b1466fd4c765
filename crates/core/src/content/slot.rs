//! Attachment slot configuration.
//!
//! A slot is one kind of attachment a parent entity carries ("photos",
//! "documents"). Slots are plain values; one generic reconciler serves every
//! parent entity by being handed that entity's slot list.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use haven_shared::RecordId;
use serde::{Deserialize, Serialize};

use super::error::ContentError;

/// A column value used in filters and rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer column.
    Int(i64),
    /// Text column.
    Text(String),
}

impl FieldValue {
    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Int(_) => None,
        }
    }

    /// Integer content, if this is an integer value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<RecordId> for FieldValue {
    fn from(value: RecordId) -> Self {
        Self::Int(value.into_inner())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

/// Column name to value map; used for equality filters and new rows.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// One attachment slot of a parent entity.
#[derive(Debug, Clone)]
pub struct AttachmentSlotConfig<F> {
    /// Payload key carrying this slot's descriptors.
    pub column_name: String,
    /// Builds the repository for this slot's table on a given session.
    pub repository_factory: F,
    /// Column referencing the parent record.
    pub relation_id_field: String,
    /// Column holding the object key.
    pub image_field: String,
    /// Images get direct URLs, documents go through the preview resolver.
    pub is_image: bool,
    /// Extra equality filters scoping every read and write of this slot.
    pub extra_filter_fields: FieldMap,
}

impl<F> AttachmentSlotConfig<F> {
    /// Create an image slot with no extra filters.
    pub fn new(
        column_name: impl Into<String>,
        repository_factory: F,
        relation_id_field: impl Into<String>,
        image_field: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            repository_factory,
            relation_id_field: relation_id_field.into(),
            image_field: image_field.into(),
            is_image: true,
            extra_filter_fields: FieldMap::new(),
        }
    }

    /// Mark the slot as holding documents rather than images.
    #[must_use]
    pub fn documents(mut self) -> Self {
        self.is_image = false;
        self
    }

    /// Add an equality filter (e.g. a discriminator column).
    #[must_use]
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra_filter_fields.insert(field.into(), value.into());
        self
    }

    /// Filters selecting every row of this slot for `record_id`.
    pub fn scope(&self, record_id: RecordId) -> FieldMap {
        let mut filters = self.extra_filter_fields.clone();
        filters.insert(self.relation_id_field.clone(), record_id.into());
        filters
    }

    /// Filters selecting the rows of this slot for `record_id` that hold `key`.
    ///
    /// Also used as the column set of a newly inserted row.
    pub fn object_scope(&self, record_id: RecordId, key: &str) -> FieldMap {
        let mut filters = self.scope(record_id);
        filters.insert(self.image_field.clone(), key.into());
        filters
    }
}

/// Reject slot lists in which two slots share a column name.
pub(crate) fn ensure_unique_columns<F>(slots: &[AttachmentSlotConfig<F>]) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for slot in slots {
        if !seen.insert(slot.column_name.as_str()) {
            return Err(ContentError::DuplicateSlot(slot.column_name.clone()));
        }
    }
    Ok(())
}
