//! End-to-end reconciliation against SQLite and in-memory object storage.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use haven_core::content::{AttachmentPayload, AttachmentReconciler, ViewerPreviewResolver};
use haven_core::storage::{StorageConfig, StorageProvider, StorageService};
use haven_db::{SeaRepositoryFactory, SeaUnitOfWork, content_registry};
use haven_shared::RecordId;

const PDF: &str = "data:application/pdf;base64,JVBERi0xLjQ=";
const VIEWER: &str = "https://viewer.example/view?url=";

type Reconciler = AttachmentReconciler<
    SeaUnitOfWork,
    SeaRepositoryFactory,
    StorageService,
    ViewerPreviewResolver<StorageService>,
>;

fn reconciler(uow: SeaUnitOfWork, entity: &str) -> (Reconciler, Arc<StorageService>) {
    let config = StorageConfig::new(StorageProvider::Memory, "https://cdn.example.com");
    let storage = Arc::new(StorageService::from_config(config).expect("Failed to build storage"));
    let preview = Arc::new(ViewerPreviewResolver::new(VIEWER, Arc::clone(&storage)));
    let slots = content_registry()
        .expect("Failed to build registry")
        .into_slots(entity)
        .expect("Unknown entity");

    let reconciler = AttachmentReconciler::new(Arc::new(uow), Arc::clone(&storage), preview, slots)
        .expect("Failed to build reconciler");
    (reconciler, storage)
}

fn payload(entries: Vec<(&str, Vec<String>)>) -> AttachmentPayload {
    entries
        .into_iter()
        .map(|(column, descriptors)| (column.to_string(), descriptors))
        .collect::<HashMap<_, _>>()
}

#[tokio::test]
async fn test_pet_lifecycle() {
    let (_dir, uow) = common::migrated_database().await;
    let (reconciler, storage) = reconciler(uow, "pets");
    let pet = RecordId::new(5);

    // Create: one photo and one document.
    let created = reconciler
        .sync(
            pet,
            &payload(vec![
                ("photos", vec!["data:image/jpeg;base64,Zm9v".to_string()]),
                ("documents", vec![PDF.to_string()]),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(created.uploaded_count(), 2);
    let photo = created.slot("photos").unwrap().uploaded[0].clone();
    let document = created.slot("documents").unwrap().uploaded[0].clone();
    assert!(storage.exists(&photo).await);
    assert!(storage.exists(&document).await);

    // List: photos resolve directly, documents through the viewer.
    let listed = reconciler.list_attachments(pet).await.unwrap();
    assert_eq!(
        listed["photos"],
        vec![format!("https://cdn.example.com/{photo}")]
    );
    assert_eq!(
        listed["documents"],
        vec![format!(
            "{VIEWER}https%3A%2F%2Fcdn.example.com%2F{document}?object={document}"
        )]
    );

    // Edit: resubmitting the listed URLs is a no-op.
    let resubmitted: AttachmentPayload = listed.into_iter().collect();
    let unchanged = reconciler.sync(pet, &resubmitted).await.unwrap();
    assert_eq!(unchanged.deleted_count(), 0);
    assert_eq!(unchanged.uploaded_count(), 0);

    // Edit: dropping the photo deletes it but leaves the document.
    let mut without_photo = resubmitted.clone();
    without_photo.insert("photos".to_string(), Vec::new());
    let edited = reconciler.sync(pet, &without_photo).await.unwrap();
    assert_eq!(edited.slot("photos").unwrap().deleted, vec![photo.clone()]);
    assert!(!storage.exists(&photo).await);
    assert!(storage.exists(&document).await);

    // Delete: purge removes everything.
    let purged = reconciler.purge_attachments(pet).await.unwrap();
    assert_eq!(purged.slot("documents").unwrap().deleted, vec![document.clone()]);
    assert!(!storage.exists(&document).await);

    let listed = reconciler.list_attachments(pet).await.unwrap();
    assert!(listed.values().all(Vec::is_empty));
}

#[tokio::test]
async fn test_records_do_not_share_attachments() {
    let (_dir, uow) = common::migrated_database().await;
    let (reconciler, _storage) = reconciler(uow, "transactions");

    reconciler
        .sync(RecordId::new(1), &payload(vec![("documents", vec![PDF.to_string()])]))
        .await
        .unwrap();
    let report = reconciler
        .sync(RecordId::new(2), &payload(vec![("documents", vec![])]))
        .await
        .unwrap();

    assert_eq!(report.deleted_count(), 0);
    assert_eq!(
        reconciler.list_attachments(RecordId::new(1)).await.unwrap()["documents"].len(),
        1
    );
}

#[tokio::test]
async fn test_malformed_upload_leaves_database_untouched() {
    let (_dir, uow) = common::migrated_database().await;
    let (reconciler, _storage) = reconciler(uow, "news");
    let news = RecordId::new(3);

    reconciler
        .sync(news, &payload(vec![("contents", vec![PDF.to_string()])]))
        .await
        .unwrap();

    let result = reconciler
        .sync(
            news,
            &payload(vec![("contents", vec!["data:image/png;base64,%%%".to_string()])]),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(
        reconciler.list_attachments(news).await.unwrap()["contents"].len(),
        1
    );
}
