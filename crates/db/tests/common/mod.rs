//! Shared setup for database integration tests.
//!
//! Every test gets its own SQLite file with the schema migrated.

use haven_db::SeaUnitOfWork;
use haven_db::migration::{Migrator, MigratorTrait};
use haven_shared::config::DatabaseConfig;
use tempfile::TempDir;

/// A migrated database that lives as long as the returned directory.
pub async fn migrated_database() -> (TempDir, SeaUnitOfWork) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("haven.db").display()),
        max_connections: 1,
        min_connections: 1,
    };

    let uow = SeaUnitOfWork::connect(&config)
        .await
        .expect("Failed to connect to database");
    Migrator::up(uow.connection(), None)
        .await
        .expect("Failed to run migrations");

    (dir, uow)
}
