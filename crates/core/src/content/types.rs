//! Reconciliation reports.

use serde::Serialize;

/// Outcome of reconciling or purging one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    /// Slot the report belongs to.
    pub column_name: String,
    /// Object keys removed from storage and the table.
    pub deleted: Vec<String>,
    /// Object keys uploaded and inserted.
    pub uploaded: Vec<String>,
}

impl SlotReport {
    /// Empty report for a slot.
    #[must_use]
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a `sync` or `purge_attachments` call, one entry per slot in
/// configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentReport {
    /// Per-slot reports.
    pub slots: Vec<SlotReport>,
}

impl AttachmentReport {
    /// Report of the slot with the given column name.
    #[must_use]
    pub fn slot(&self, column_name: &str) -> Option<&SlotReport> {
        self.slots.iter().find(|slot| slot.column_name == column_name)
    }

    /// Total number of deleted keys.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.slots.iter().map(|slot| slot.deleted.len()).sum()
    }

    /// Total number of uploaded keys.
    #[must_use]
    pub fn uploaded_count(&self) -> usize {
        self.slots.iter().map(|slot| slot.uploaded.len()).sum()
    }
}
