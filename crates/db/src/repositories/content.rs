//! Attachment repository for database operations.
//!
//! One repository type serves every attachment table: statements are built
//! with sea-query against a [`ContentTable`] descriptor and run on the
//! reconciler's open transaction.

use haven_core::content::{
    ContentError, ContentRepository, ContentRow, FieldMap, FieldValue, RepositoryFactory,
};
use haven_shared::ContentRowId;
use sea_orm::sea_query::{Alias, Expr, Order, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr, QueryResult, Statement, Value};

use crate::tables::{ColumnKind, ContentColumn, ContentTable, ID_COLUMN};

fn db_error(err: DbErr) -> ContentError {
    ContentError::persistence(err.to_string())
}

/// Primary key of a result row; `id` is a 32-bit serial on Postgres.
fn row_id(row: &QueryResult) -> Result<i64, ContentError> {
    row.try_get::<i64>("", ID_COLUMN)
        .or_else(|_| row.try_get::<i32>("", ID_COLUMN).map(i64::from))
        .map_err(db_error)
}

/// Builds [`SeaContentRepository`] instances for one table.
#[derive(Debug, Clone, Copy)]
pub struct SeaRepositoryFactory {
    table: &'static ContentTable,
}

impl SeaRepositoryFactory {
    /// Create a factory for `table`.
    #[must_use]
    pub fn new(table: &'static ContentTable) -> Self {
        Self { table }
    }

    /// Table served by this factory.
    #[must_use]
    pub fn table(&self) -> &'static ContentTable {
        self.table
    }
}

impl RepositoryFactory<DatabaseTransaction> for SeaRepositoryFactory {
    type Repository<'s> = SeaContentRepository<'s>;

    fn bind<'s>(&'s self, session: &'s DatabaseTransaction) -> SeaContentRepository<'s> {
        SeaContentRepository::new(session, self.table)
    }
}

/// Attachment repository bound to an open transaction.
#[derive(Debug)]
pub struct SeaContentRepository<'s> {
    txn: &'s DatabaseTransaction,
    table: &'static ContentTable,
}

impl<'s> SeaContentRepository<'s> {
    /// Create a repository for `table` running on `txn`.
    #[must_use]
    pub fn new(txn: &'s DatabaseTransaction, table: &'static ContentTable) -> Self {
        Self { txn, table }
    }

    fn column(&self, field: &str) -> Result<&'static ContentColumn, ContentError> {
        self.table.column(field).ok_or_else(|| {
            ContentError::persistence(format!(
                "table `{}` has no column `{field}`",
                self.table.name
            ))
        })
    }

    /// Equality conditions for `filters`, checked against the table schema.
    fn conditions(&self, filters: &FieldMap) -> Result<Vec<SimpleExpr>, ContentError> {
        filters
            .iter()
            .map(|(field, value)| {
                let value = self.bind_value(field, value)?;
                Ok(Expr::col(Alias::new(field.as_str())).eq(value))
            })
            .collect()
    }

    fn bind_value(&self, field: &str, value: &FieldValue) -> Result<Value, ContentError> {
        let column = self.column(field)?;
        match (column.kind, value) {
            (ColumnKind::Int, FieldValue::Int(v)) => Ok(Value::from(*v)),
            (ColumnKind::Text, FieldValue::Text(v)) => Ok(Value::from(v.clone())),
            _ => Err(ContentError::persistence(format!(
                "value `{value}` does not fit column `{}.{field}`",
                self.table.name
            ))),
        }
    }

    /// `SELECT id, <columns> ... WHERE <filters> ORDER BY id`.
    fn select_statement(&self, filters: &FieldMap) -> Result<Statement, ContentError> {
        let mut query = Query::select();
        query
            .column(Alias::new(ID_COLUMN))
            .columns(self.table.columns.iter().map(|column| Alias::new(column.name)))
            .from(Alias::new(self.table.name))
            .order_by(Alias::new(ID_COLUMN), Order::Asc);
        for condition in self.conditions(filters)? {
            query.and_where(condition);
        }
        Ok(self.txn.get_database_backend().build(&query))
    }

    fn insert_statement(&self, fields: &FieldMap, returning: bool) -> Result<Statement, ContentError> {
        let values = fields
            .iter()
            .map(|(field, value)| self.bind_value(field, value).map(SimpleExpr::from))
            .collect::<Result<Vec<_>, _>>()?;

        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(self.table.name))
            .columns(fields.keys().map(|field| Alias::new(field.as_str())))
            .values(values)
            .map_err(|e| ContentError::persistence(e.to_string()))?;
        if returning {
            insert.returning_col(Alias::new(ID_COLUMN));
        }
        Ok(self.txn.get_database_backend().build(&insert))
    }

    fn delete_statement(&self, filters: &FieldMap) -> Result<Statement, ContentError> {
        if filters.is_empty() {
            return Err(ContentError::persistence(format!(
                "refusing to delete from `{}` without a filter",
                self.table.name
            )));
        }

        let mut delete = Query::delete();
        delete.from_table(Alias::new(self.table.name));
        for condition in self.conditions(filters)? {
            delete.and_where(condition);
        }
        Ok(self.txn.get_database_backend().build(&delete))
    }

    fn decode_row(&self, row: &QueryResult) -> Result<ContentRow, ContentError> {
        let id = row_id(row)?;

        let mut fields = FieldMap::new();
        for column in self.table.columns {
            let value = match column.kind {
                ColumnKind::Int => FieldValue::Int(row.try_get("", column.name).map_err(db_error)?),
                ColumnKind::Text => {
                    FieldValue::Text(row.try_get("", column.name).map_err(db_error)?)
                }
            };
            fields.insert(column.name.to_string(), value);
        }

        Ok(ContentRow {
            id: ContentRowId::new(id),
            fields,
        })
    }
}

impl ContentRepository for SeaContentRepository<'_> {
    async fn find_filtered(&self, filters: &FieldMap) -> Result<Vec<ContentRow>, ContentError> {
        let statement = self.select_statement(filters)?;
        let rows = self.txn.query_all(statement).await.map_err(db_error)?;

        rows.iter().map(|row| self.decode_row(row)).collect()
    }

    async fn add_one(&self, fields: &FieldMap) -> Result<ContentRow, ContentError> {
        let returning = self.txn.get_database_backend().support_returning();
        let statement = self.insert_statement(fields, returning)?;

        let id = if returning {
            let row = self
                .txn
                .query_one(statement)
                .await
                .map_err(db_error)?
                .ok_or_else(|| ContentError::persistence("insert returned no row"))?;
            row_id(&row)?
        } else {
            let result = self.txn.execute(statement).await.map_err(db_error)?;
            i64::try_from(result.last_insert_id())
                .map_err(|e| ContentError::persistence(e.to_string()))?
        };

        Ok(ContentRow {
            id: ContentRowId::new(id),
            fields: fields.clone(),
        })
    }

    async fn delete_filtered(&self, filters: &FieldMap) -> Result<u64, ContentError> {
        let statement = self.delete_statement(filters)?;
        let result = self.txn.execute(statement).await.map_err(db_error)?;
        Ok(result.rows_affected())
    }
}
