//! Transaction management for the attachment reconciler.

use haven_core::content::{ContentError, UnitOfWork};
use haven_shared::config::DatabaseConfig;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    TransactionTrait,
};
use tracing::info;

/// Opens one `SeaORM` transaction per reconciler session.
#[derive(Debug, Clone)]
pub struct SeaUnitOfWork {
    db: DatabaseConnection,
}

impl SeaUnitOfWork {
    /// Wrap an existing connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect a pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .sqlx_logging(false);

        let db = Database::connect(options).await?;
        info!(
            backend = ?db.get_database_backend(),
            max_connections = config.max_connections,
            "database connected"
        );
        Ok(Self { db })
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Close the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be shut down cleanly.
    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await
    }
}

impl UnitOfWork for SeaUnitOfWork {
    type Session = DatabaseTransaction;

    async fn begin(&self) -> Result<DatabaseTransaction, ContentError> {
        self.db
            .begin()
            .await
            .map_err(|e| ContentError::persistence(e.to_string()))
    }

    async fn commit(&self, session: DatabaseTransaction) -> Result<(), ContentError> {
        session
            .commit()
            .await
            .map_err(|e| ContentError::persistence(e.to_string()))
    }

    async fn rollback(&self, session: DatabaseTransaction) -> Result<(), ContentError> {
        session
            .rollback()
            .await
            .map_err(|e| ContentError::persistence(e.to_string()))
    }
}
