//! Error types for Hoarfrost

use thiserror::Error;

/// The main error type for Hoarfrost operations
#[derive(Error, Debug)]
pub enum Error {
    /// Connection could not be established
    #[error("connection could not be established, reason: {message}")]
    Connection { message: String },

    /// The configured database could not be selected
    #[error("could not handle or get into the chosen database '{database}', reason: {message}")]
    DatabaseSelect { database: String, message: String },

    /// The driver rejected a query
    #[error("could not process the given query, reason: {message}")]
    QueryExecution { message: String },

    /// Write query issued through a read-mode session
    #[error("the session doesn't have the permission for this query, change the access mode to 'write' first")]
    PermissionDenied { query: String },

    /// A builder option could not be applied
    #[error("could not create the query, reason: {message}")]
    QueryConstruction { message: String },

    /// Unknown session option name
    #[error("unknown session option '{name}'")]
    UnknownOption { name: String },

    /// An item with the same id is already present in the collection
    #[error("item with the same id '{id}' already exists")]
    DuplicateItem { id: String },

    /// No stored result to read from
    #[error("no result available, run a query first")]
    NoResult,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result type for Hoarfrost operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new database selection error
    pub fn database_select(database: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatabaseSelect {
            database: database.into(),
            message: message.into(),
        }
    }

    /// Create a new query execution error
    pub fn query_execution(message: impl Into<String>) -> Self {
        Self::QueryExecution {
            message: message.into(),
        }
    }

    /// Create a new permission error for the given query
    pub fn permission_denied(query: impl Into<String>) -> Self {
        Self::PermissionDenied {
            query: query.into(),
        }
    }

    /// Create a new query construction error
    pub fn construction(message: impl Into<String>) -> Self {
        Self::QueryConstruction {
            message: message.into(),
        }
    }

    /// Create a new unknown option error
    pub fn unknown_option(name: impl Into<String>) -> Self {
        Self::UnknownOption { name: name.into() }
    }

    /// Create a new duplicate item error
    pub fn duplicate_item(id: impl Into<String>) -> Self {
        Self::DuplicateItem { id: id.into() }
    }
}
