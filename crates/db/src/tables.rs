//! Attachment table descriptors.
//!
//! Every attachment table has an auto-incrementing `id` primary key plus the
//! columns listed here.

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 64-bit integer.
    Int,
    /// Text.
    Text,
}

/// A non-key column of an attachment table.
#[derive(Debug)]
pub struct ContentColumn {
    /// Column name.
    pub name: &'static str,
    /// Column type.
    pub kind: ColumnKind,
}

/// An attachment table.
#[derive(Debug)]
pub struct ContentTable {
    /// Table name.
    pub name: &'static str,
    /// Columns other than `id`.
    pub columns: &'static [ContentColumn],
}

/// Name of the primary key column shared by all attachment tables.
pub const ID_COLUMN: &str = "id";

impl ContentTable {
    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ContentColumn> {
        self.columns.iter().find(|column| column.name == name)
    }
}

const fn int(name: &'static str) -> ContentColumn {
    ContentColumn {
        name,
        kind: ColumnKind::Int,
    }
}

const fn text(name: &'static str) -> ContentColumn {
    ContentColumn {
        name,
        kind: ColumnKind::Text,
    }
}

/// Images attached to news items.
pub static NEWS_CONTENTS: ContentTable = ContentTable {
    name: "news_contents",
    columns: &[int("news_id"), text("uri")],
};

/// Images attached to articles.
pub static ARTICLE_CONTENTS: ContentTable = ContentTable {
    name: "article_contents",
    columns: &[int("article_id"), text("uri")],
};

/// Photos and documents of pets, told apart by `kind`.
pub static PET_CONTENTS: ContentTable = ContentTable {
    name: "pet_contents",
    columns: &[int("pet_id"), text("uri"), text("kind")],
};

/// Documents attached to transactions.
pub static TRANSACTION_CONTENTS: ContentTable = ContentTable {
    name: "transaction_contents",
    columns: &[int("transaction_id"), text("uri")],
};

/// Every attachment table, in creation order.
pub static ALL_TABLES: [&ContentTable; 4] = [
    &NEWS_CONTENTS,
    &ARTICLE_CONTENTS,
    &PET_CONTENTS,
    &TRANSACTION_CONTENTS,
];
