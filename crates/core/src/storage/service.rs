//! Storage service implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::ObjectStore;
use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Storage service for content attachments.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(operator)
    }

    /// Generate a storage key for a new object.
    ///
    /// Format: `{uuid}.{extension}`; the extension is omitted when the MIME
    /// type has none. Keys never contain `/` so they survive being read back
    /// out of a display URL.
    #[must_use]
    pub fn generate_object_key(mimetype: &str) -> String {
        let id = Uuid::new_v4().simple();
        match extension_for(mimetype) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }

    /// Read an object back from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be read.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_bytes())
    }

    /// Check if an object exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

impl ObjectStore for StorageService {
    #[instrument(skip(self, data), fields(provider = self.provider_name(), size = data.len()))]
    async fn upload(&self, data: Bytes, mimetype: &str) -> Result<String, StorageError> {
        let key = Self::generate_object_key(mimetype);
        self.operator
            .write_with(&key, data)
            .content_type(mimetype)
            .await?;

        debug!(%key, "object uploaded");
        Ok(key)
    }

    #[instrument(skip(self), fields(provider = self.provider_name()))]
    async fn delete_by_name(&self, key: &str) -> Result<(), StorageError> {
        match self.operator.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn get_url(&self, key: &str) -> String {
        format!("{}/{key}", self.config.public_url.trim_end_matches('/'))
    }
}

/// File extension for a MIME type, preferring the common spelling for JPEG.
fn extension_for(mimetype: &str) -> Option<&'static str> {
    match mimetype {
        "image/jpeg" => Some("jpg"),
        _ => mime_guess::get_mime_extensions_str(mimetype).and_then(|exts| exts.first().copied()),
    }
}
