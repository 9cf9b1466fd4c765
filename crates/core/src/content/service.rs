//! Attachment reconciler implementation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use haven_shared::RecordId;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::descriptor::{self, document_url};
use super::error::ContentError;
use super::inline::InlinePayload;
use super::preview::PreviewResolver;
use super::repository::{ContentRepository, RepositoryFactory, UnitOfWork};
use super::slot::{AttachmentSlotConfig, FieldValue, ensure_unique_columns};
use super::types::{AttachmentReport, SlotReport};
use crate::media::{ImageCompressor, ImageFormatKind};
use crate::storage::ObjectStore;

/// Desired descriptors per slot column.
pub type AttachmentPayload = HashMap<String, Vec<String>>;

/// Keeps a record's stored attachments in line with the descriptors submitted
/// for it.
///
/// One reconciler serves one parent entity; its behavior is fully determined
/// by the slot list it is built with.
pub struct AttachmentReconciler<U, F, S, P> {
    uow: Arc<U>,
    storage: Arc<S>,
    preview: Arc<P>,
    compressor: ImageCompressor,
    slots: Vec<AttachmentSlotConfig<F>>,
}

impl<U, F, S, P> AttachmentReconciler<U, F, S, P>
where
    U: UnitOfWork,
    F: RepositoryFactory<U::Session>,
    S: ObjectStore,
    P: PreviewResolver,
{
    /// Create a reconciler over `slots`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::DuplicateSlot`] if two slots share a column.
    pub fn new(
        uow: Arc<U>,
        storage: Arc<S>,
        preview: Arc<P>,
        slots: Vec<AttachmentSlotConfig<F>>,
    ) -> Result<Self, ContentError> {
        ensure_unique_columns(&slots)?;
        Ok(Self {
            uow,
            storage,
            preview,
            compressor: ImageCompressor::default(),
            slots,
        })
    }

    /// Replace the image compressor.
    #[must_use]
    pub fn with_compressor(mut self, compressor: ImageCompressor) -> Self {
        self.compressor = compressor;
        self
    }

    /// Configured slots, in reconciliation order.
    #[must_use]
    pub fn slots(&self) -> &[AttachmentSlotConfig<F>] {
        &self.slots
    }

    /// Pick the configured slot columns out of a full record body.
    ///
    /// Missing and `null` columns are left out, which `sync` treats as an
    /// empty descriptor list.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidPayload`] if the body is not an object,
    /// a slot column is not an array, or an entry is not a string.
    pub fn extract_payload(&self, body: &Value) -> Result<AttachmentPayload, ContentError> {
        let object = body
            .as_object()
            .ok_or_else(|| ContentError::invalid_payload("record body must be a JSON object"))?;

        let mut payload = AttachmentPayload::new();
        for slot in &self.slots {
            let column = slot.column_name.as_str();
            let items = match object.get(column) {
                None | Some(Value::Null) => continue,
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(ContentError::invalid_payload(format!(
                        "`{column}` must be an array"
                    )));
                }
            };
            let descriptors = items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ContentError::invalid_payload(format!("`{column}` entries must be strings"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            payload.insert(column.to_string(), descriptors);
        }
        Ok(payload)
    }

    /// Reconcile every slot of `record_id` against `payload`.
    ///
    /// Each slot runs in its own transaction. A failing slot is rolled back
    /// and the error returned; slots reconciled before it stay committed.
    ///
    /// # Errors
    ///
    /// Returns the first decode, storage or persistence error encountered.
    #[instrument(skip_all, fields(record_id = %record_id))]
    pub async fn sync(
        &self,
        record_id: RecordId,
        payload: &AttachmentPayload,
    ) -> Result<AttachmentReport, ContentError> {
        let mut report = AttachmentReport::default();

        for slot in &self.slots {
            let descriptors = payload
                .get(&slot.column_name)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let session = self.uow.begin().await?;
            let outcome = self.sync_slot(&session, slot, record_id, descriptors).await;
            let slot_report = self.finish(session, outcome).await?;

            info!(
                column = %slot.column_name,
                deleted = slot_report.deleted.len(),
                uploaded = slot_report.uploaded.len(),
                "slot reconciled"
            );
            report.slots.push(slot_report);
        }

        Ok(report)
    }

    /// Display URLs of every stored attachment of `record_id`, per slot.
    ///
    /// Images resolve to their direct storage URL; documents to a preview URL
    /// tagged with `?object=<key>`.
    ///
    /// # Errors
    ///
    /// Returns an error if a read or preview lookup fails.
    #[instrument(skip_all, fields(record_id = %record_id))]
    pub async fn list_attachments(
        &self,
        record_id: RecordId,
    ) -> Result<BTreeMap<String, Vec<String>>, ContentError> {
        let session = self.uow.begin().await?;
        let outcome = self.collect_urls(&session, record_id).await;
        self.finish(session, outcome).await
    }

    /// Remove every stored attachment of `record_id`, storage object first.
    ///
    /// # Errors
    ///
    /// Returns the first storage or persistence error; slots purged before
    /// it stay committed.
    #[instrument(skip_all, fields(record_id = %record_id))]
    pub async fn purge_attachments(
        &self,
        record_id: RecordId,
    ) -> Result<AttachmentReport, ContentError> {
        let mut report = AttachmentReport::default();

        for slot in &self.slots {
            let session = self.uow.begin().await?;
            let outcome = self.purge_slot(&session, slot, record_id).await;
            let slot_report = self.finish(session, outcome).await?;

            info!(
                column = %slot.column_name,
                deleted = slot_report.deleted.len(),
                "slot purged"
            );
            report.slots.push(slot_report);
        }

        Ok(report)
    }

    async fn sync_slot(
        &self,
        session: &U::Session,
        slot: &AttachmentSlotConfig<F>,
        record_id: RecordId,
        descriptors: &[String],
    ) -> Result<SlotReport, ContentError> {
        let repo = slot.repository_factory.bind(session);
        let (existing, new) = descriptor::partition(descriptors);

        // Nothing is touched until every inline upload has decoded.
        let uploads = new
            .into_iter()
            .map(InlinePayload::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let persisted = persisted_keys(&repo, slot, record_id).await?;
        let referenced: HashSet<&str> = existing.into_iter().map(descriptor::object_key).collect();

        let mut report = SlotReport::new(&slot.column_name);
        for key in keys_to_delete(&persisted, &referenced) {
            self.delete_object(&repo, slot, record_id, &key).await?;
            report.deleted.push(key);
        }

        for upload in uploads {
            let key = self.store_upload(upload).await?;
            repo.add_one(&slot.object_scope(record_id, &key)).await?;
            report.uploaded.push(key);
        }

        Ok(report)
    }

    async fn purge_slot(
        &self,
        session: &U::Session,
        slot: &AttachmentSlotConfig<F>,
        record_id: RecordId,
    ) -> Result<SlotReport, ContentError> {
        let repo = slot.repository_factory.bind(session);
        let persisted = persisted_keys(&repo, slot, record_id).await?;

        let mut report = SlotReport::new(&slot.column_name);
        for key in keys_to_delete(&persisted, &HashSet::new()) {
            self.delete_object(&repo, slot, record_id, &key).await?;
            report.deleted.push(key);
        }
        Ok(report)
    }

    async fn collect_urls(
        &self,
        session: &U::Session,
        record_id: RecordId,
    ) -> Result<BTreeMap<String, Vec<String>>, ContentError> {
        let mut urls = BTreeMap::new();

        for slot in &self.slots {
            let repo = slot.repository_factory.bind(session);
            let keys = persisted_keys(&repo, slot, record_id).await?;

            let mut slot_urls = Vec::with_capacity(keys.len());
            for key in &keys {
                let url = if slot.is_image {
                    self.storage.get_url(key)
                } else {
                    document_url(&self.preview.get_preview(key).await?, key)
                };
                slot_urls.push(url);
            }
            urls.insert(slot.column_name.clone(), slot_urls);
        }

        Ok(urls)
    }

    /// Storage first: if the object cannot be removed its row is kept.
    async fn delete_object<R: ContentRepository>(
        &self,
        repo: &R,
        slot: &AttachmentSlotConfig<F>,
        record_id: RecordId,
        key: &str,
    ) -> Result<(), ContentError> {
        self.storage.delete_by_name(key).await?;
        let removed = repo
            .delete_filtered(&slot.object_scope(record_id, key))
            .await?;
        debug!(key, removed, "attachment deleted");
        Ok(())
    }

    async fn store_upload(&self, upload: InlinePayload) -> Result<String, ContentError> {
        let data = match upload.image_format() {
            Some(format) => self.compress(upload.data, format).await?,
            None => upload.data,
        };
        let key = self.storage.upload(data, &upload.mimetype).await?;
        debug!(key = %key, mimetype = %upload.mimetype, "attachment uploaded");
        Ok(key)
    }

    /// Compress on the blocking pool; bytes the codec rejects are stored as
    /// they came.
    async fn compress(&self, data: Bytes, format: ImageFormatKind) -> Result<Bytes, ContentError> {
        let compressor = self.compressor;
        let input = data.clone();
        let result = tokio::task::spawn_blocking(move || compressor.compress(&input, format))
            .await
            .map_err(|e| ContentError::Task(e.to_string()))?;

        match result {
            Ok(compressed) => {
                debug!(
                    original = data.len(),
                    compressed = compressed.len(),
                    "image compressed"
                );
                Ok(Bytes::from(compressed))
            }
            Err(err) => {
                warn!(error = %err, ?format, "image not compressible, storing original bytes");
                Ok(data)
            }
        }
    }

    /// Commit on success; roll back and hand the error on otherwise.
    async fn finish<T>(
        &self,
        session: U::Session,
        outcome: Result<T, ContentError>,
    ) -> Result<T, ContentError> {
        match outcome {
            Ok(value) => {
                self.uow.commit(session).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.uow.rollback(session).await {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Object keys stored for `record_id` in `slot`, in repository order.
async fn persisted_keys<R: ContentRepository, F>(
    repo: &R,
    slot: &AttachmentSlotConfig<F>,
    record_id: RecordId,
) -> Result<Vec<String>, ContentError> {
    let rows = repo.find_filtered(&slot.scope(record_id)).await?;
    rows.iter()
        .map(|row| {
            row.get(&slot.image_field)
                .and_then(FieldValue::as_text)
                .map(str::to_string)
                .ok_or_else(|| {
                    ContentError::persistence(format!(
                        "row {} has no text `{}` column",
                        row.id, slot.image_field
                    ))
                })
        })
        .collect()
}

/// Persisted keys not referenced by the payload, deduplicated, in persisted
/// order.
pub(crate) fn keys_to_delete(persisted: &[String], referenced: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    persisted
        .iter()
        .filter(|key| !referenced.contains(key.as_str()) && seen.insert(key.as_str()))
        .cloned()
        .collect()
}
