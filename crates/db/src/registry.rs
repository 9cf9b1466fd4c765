//! Attachment slots of every parent entity.

use haven_core::content::{AttachmentSlotConfig, ContentError, ContentRegistry};

use crate::repositories::SeaRepositoryFactory;
use crate::tables::{ARTICLE_CONTENTS, NEWS_CONTENTS, PET_CONTENTS, TRANSACTION_CONTENTS};

/// Slot lists for news, articles, pets and transactions.
///
/// # Errors
///
/// Returns [`ContentError::DuplicateSlot`] if an entity lists a column twice.
pub fn content_registry() -> Result<ContentRegistry<SeaRepositoryFactory>, ContentError> {
    ContentRegistry::new()
        .register(
            "news",
            vec![AttachmentSlotConfig::new(
                "contents",
                SeaRepositoryFactory::new(&NEWS_CONTENTS),
                "news_id",
                "uri",
            )],
        )?
        .register(
            "articles",
            vec![AttachmentSlotConfig::new(
                "contents",
                SeaRepositoryFactory::new(&ARTICLE_CONTENTS),
                "article_id",
                "uri",
            )],
        )?
        .register(
            "pets",
            vec![
                AttachmentSlotConfig::new(
                    "photos",
                    SeaRepositoryFactory::new(&PET_CONTENTS),
                    "pet_id",
                    "uri",
                )
                .with_filter("kind", "photo"),
                AttachmentSlotConfig::new(
                    "documents",
                    SeaRepositoryFactory::new(&PET_CONTENTS),
                    "pet_id",
                    "uri",
                )
                .with_filter("kind", "document")
                .documents(),
            ],
        )?
        .register(
            "transactions",
            vec![
                AttachmentSlotConfig::new(
                    "documents",
                    SeaRepositoryFactory::new(&TRANSACTION_CONTENTS),
                    "transaction_id",
                    "uri",
                )
                .documents(),
            ],
        )
}
