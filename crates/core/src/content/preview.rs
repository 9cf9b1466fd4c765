//! Preview URLs for non-image documents.

use std::future::Future;
use std::sync::Arc;

use super::error::ContentError;
use crate::storage::ObjectStore;

/// Derives a viewable URL for a stored document.
pub trait PreviewResolver: Send + Sync {
    /// Preview URL for the object stored under `key`.
    fn get_preview(&self, key: &str) -> impl Future<Output = Result<String, ContentError>> + Send;
}

/// Embeds the document's direct storage URL into an online viewer URL.
pub struct ViewerPreviewResolver<S> {
    viewer_url: String,
    storage: Arc<S>,
}

impl<S: ObjectStore> ViewerPreviewResolver<S> {
    /// Create a resolver; `viewer_url` is a prefix the encoded object URL is
    /// appended to, e.g. `https://docs.google.com/viewer?embedded=true&url=`.
    #[must_use]
    pub fn new(viewer_url: impl Into<String>, storage: Arc<S>) -> Self {
        Self {
            viewer_url: viewer_url.into(),
            storage,
        }
    }
}

impl<S: ObjectStore> PreviewResolver for ViewerPreviewResolver<S> {
    async fn get_preview(&self, key: &str) -> Result<String, ContentError> {
        let object_url = self.storage.get_url(key);
        Ok(format!(
            "{}{}",
            self.viewer_url,
            urlencoding::encode(&object_url)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::descriptor::{document_url, object_key};
    use crate::storage::{StorageConfig, StorageProvider, StorageService};

    fn resolver() -> ViewerPreviewResolver<StorageService> {
        let config = StorageConfig::new(StorageProvider::Memory, "https://cdn.example.com/media");
        let storage = Arc::new(StorageService::from_config(config).unwrap());
        ViewerPreviewResolver::new("https://viewer.example/view?url=", storage)
    }

    #[tokio::test]
    async fn test_preview_embeds_encoded_object_url() {
        let url = resolver().get_preview("report.pdf").await.unwrap();
        assert_eq!(
            url,
            "https://viewer.example/view?url=https%3A%2F%2Fcdn.example.com%2Fmedia%2Freport.pdf"
        );
    }

    #[tokio::test]
    async fn test_preview_document_url_recovers_key() {
        let preview = resolver().get_preview("7f3a.pdf").await.unwrap();
        assert_eq!(object_key(&document_url(&preview, "7f3a.pdf")), "7f3a.pdf");
    }
}
