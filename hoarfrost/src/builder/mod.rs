//! Query builders for the supported statement kinds

pub mod common;
pub mod delete;
pub mod insert;
pub mod replace;
pub mod select;
pub mod truncate;
pub mod update;

pub use common::{
    ConditionList, Fragment, IntoColumns, IntoTables, JoinKind, QueryContext, Relation, SortOrder,
    Statement,
};
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use replace::ReplaceBuilder;
pub use select::SelectBuilder;
pub use truncate::TruncateBuilder;
pub use update::UpdateBuilder;
