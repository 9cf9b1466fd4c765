//! Attachment tables migration.
//!
//! Creates one table per parent entity holding the object keys of its
//! attachments. Built with the schema builder so it runs on Postgres and
//! SQLite alike.

use sea_orm_migration::prelude::*;

use crate::tables::{ALL_TABLES, ColumnKind, ContentTable, ID_COLUMN};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ALL_TABLES {
            manager.create_table(create_table(table)).await?;
            manager.create_index(relation_index(table)).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ALL_TABLES.iter().rev() {
            manager
                .drop_table(Table::drop().table(Alias::new(table.name)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn create_table(table: &ContentTable) -> TableCreateStatement {
    let mut statement = Table::create();
    statement
        .table(Alias::new(table.name))
        .if_not_exists()
        .col(
            ColumnDef::new(Alias::new(ID_COLUMN))
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        );

    for column in table.columns {
        let mut def = ColumnDef::new(Alias::new(column.name));
        match column.kind {
            ColumnKind::Int => def.big_integer(),
            ColumnKind::Text => def.text(),
        };
        statement.col(def.not_null());
    }

    statement.to_owned()
}

/// Index on the first column, which references the parent record.
fn relation_index(table: &ContentTable) -> IndexCreateStatement {
    let mut index = Index::create();
    index
        .name(format!("idx_{}_relation", table.name))
        .table(Alias::new(table.name))
        .if_not_exists();
    if let Some(relation) = table.columns.first() {
        index.col(Alias::new(relation.name));
    }
    index.to_owned()
}
