//! CRUD-level error types.

use thiserror::Error;

/// Why a create/update/delete did not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrudError {
    /// Update and delete need an identity value to act on.
    #[error("select a {column} first")]
    NoSelection { column: &'static str },

    /// A submitted field failed validation.
    #[error("{field} {reason}")]
    Validation { field: &'static str, reason: String },

    /// The record names a column the table does not have (or its identity).
    #[error("'{field}' is not an editable field of {table}")]
    UnknownField { field: String, table: &'static str },

    #[error("no row in {table} with {column} = {id}")]
    NotFound {
        table: &'static str,
        column: &'static str,
        id: i64,
    },

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// The statement was rejected or the database is unreachable. The
    /// details are on the data store's warning banner.
    #[error("the operation could not be completed")]
    WriteFailed,
}
