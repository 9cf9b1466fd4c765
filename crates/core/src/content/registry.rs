//! Per-entity attachment slot lists.

use std::collections::BTreeMap;

use super::error::ContentError;
use super::slot::{AttachmentSlotConfig, ensure_unique_columns};

/// Slot lists keyed by parent entity name ("news", "pets", ...).
#[derive(Debug, Clone)]
pub struct ContentRegistry<F> {
    entities: BTreeMap<String, Vec<AttachmentSlotConfig<F>>>,
}

impl<F> Default for ContentRegistry<F> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }
}

impl<F> ContentRegistry<F> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the slots of a parent entity, replacing any earlier list.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::DuplicateSlot`] if two slots share a column.
    pub fn register(
        mut self,
        entity: impl Into<String>,
        slots: Vec<AttachmentSlotConfig<F>>,
    ) -> Result<Self, ContentError> {
        ensure_unique_columns(&slots)?;
        self.entities.insert(entity.into(), slots);
        Ok(self)
    }

    /// Slots of a parent entity.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnknownEntity`] if nothing is registered
    /// under `entity`.
    pub fn slots(&self, entity: &str) -> Result<&[AttachmentSlotConfig<F>], ContentError> {
        self.entities
            .get(entity)
            .map(Vec::as_slice)
            .ok_or_else(|| ContentError::UnknownEntity(entity.to_string()))
    }

    /// Take the slots of a parent entity out of the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnknownEntity`] if nothing is registered
    /// under `entity`.
    pub fn into_slots(mut self, entity: &str) -> Result<Vec<AttachmentSlotConfig<F>>, ContentError> {
        self.entities
            .remove(entity)
            .ok_or_else(|| ContentError::UnknownEntity(entity.to_string()))
    }

    /// Registered entity names, sorted.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}
