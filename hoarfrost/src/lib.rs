//! Hoarfrost - fluent MySQL query construction with chainable result collections
//!
//! Queries are assembled through fluent builders and rendered either as
//! compact single-line SQL or as a readable multi-line format. A [`Session`]
//! holds the configuration, the driver connection, replacement tokens and
//! the result of the last query, which can be fetched as plain rows or as a
//! filterable [`Collection`] of items.

pub mod builder;
pub mod collection;
pub mod config;
pub mod driver;
pub mod error;
pub mod escape;
pub mod item;
pub mod session;
pub mod value;

// Re-export main types
pub use builder::{
    DeleteBuilder, InsertBuilder, IntoColumns, IntoTables, JoinKind, ReplaceBuilder,
    SelectBuilder, SortOrder, Statement, TruncateBuilder, UpdateBuilder,
};
pub use collection::{Collection, Filter, FilterLogic};
pub use config::SessionConfig;
pub use driver::{Driver, NullDriver, QueryOutcome, Row};
pub use error::{Error, Result};
pub use escape::Escaper;
pub use item::CollectionItem;
pub use session::{AccessMode, Session};
pub use value::Value;

use builder::QueryContext;

// Detached builders render compact and raise hard errors; builders started
// through a session inherit its settings instead.
fn detached() -> QueryContext {
    QueryContext::new(false, true)
}

/// Start a SELECT query without a session.
pub fn select() -> SelectBuilder {
    SelectBuilder::new(detached())
}

/// Start an INSERT query against the given table.
pub fn insert(table: &str) -> InsertBuilder {
    let mut insert = InsertBuilder::new(detached());
    insert.table(table);
    insert
}

/// Start a REPLACE query against the given table.
pub fn replace(table: &str) -> ReplaceBuilder {
    let mut replace = ReplaceBuilder::new(detached());
    replace.table(table);
    replace
}

/// Start an UPDATE query against the given tables.
pub fn update(tables: impl IntoTables) -> UpdateBuilder {
    let mut update = UpdateBuilder::new(detached());
    update.table(tables);
    update
}

/// Start a DELETE query against the given tables.
pub fn delete(tables: impl IntoTables) -> DeleteBuilder {
    let mut delete = DeleteBuilder::new(detached());
    delete.table(tables);
    delete
}

/// Start a TRUNCATE query against the given table.
pub fn truncate(table: &str) -> TruncateBuilder {
    let mut truncate = TruncateBuilder::new(detached());
    truncate.table(table);
    truncate
}
