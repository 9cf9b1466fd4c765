//! Storage configuration types.

use haven_shared::config::StorageSettings;

pub use haven_shared::config::StorageProvider;

/// Storage service configuration.
///
/// Uploads are accepted regardless of MIME type or size; callers decide what
/// they store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Base URL that object keys are appended to when building display URLs.
    pub public_url: String,
}

impl StorageConfig {
    /// Create a new storage config.
    #[must_use]
    pub fn new(provider: StorageProvider, public_url: impl Into<String>) -> Self {
        Self {
            provider,
            public_url: public_url.into(),
        }
    }

    /// Build the runtime config from loaded application settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.provider.clone(), settings.public_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = StorageSettings {
            provider: StorageProvider::local_fs("./storage"),
            public_url: "http://localhost:9000/media".to_string(),
        };
        let config = StorageConfig::from_settings(&settings);
        assert_eq!(config.provider.name(), "local");
        assert_eq!(config.public_url, "http://localhost:9000/media");
    }
}
