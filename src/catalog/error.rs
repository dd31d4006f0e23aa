//! Inspector error types.

use std::fmt;

use thiserror::Error;

/// Result type for catalog operations.
pub type InspectResult<T> = Result<T, InspectError>;

/// The catalog operation that was running when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOperation {
    Enums,
    Tables,
    Columns,
    PrimaryKey,
    Indexes,
}

impl fmt::Display for CatalogOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CatalogOperation::Enums => "querying enums",
            CatalogOperation::Tables => "querying tables",
            CatalogOperation::Columns => "querying columns",
            CatalogOperation::PrimaryKey => "querying primary key",
            CatalogOperation::Indexes => "querying indexes",
        };
        f.write_str(label)
    }
}

/// Errors raised while reading the catalog.
///
/// None of these are retried: a failed catalog read aborts the run.
#[derive(Error, Debug)]
pub enum InspectError {
    /// The query itself failed (connection, SQL or driver error).
    #[error("{operation}: {source}")]
    Query {
        operation: CatalogOperation,
        #[source]
        source: sqlx::Error,
    },

    /// A row came back with a value we cannot interpret.
    #[error("{operation}: column '{column}' has unexpected value '{value}'")]
    Decode {
        operation: CatalogOperation,
        column: String,
        value: String,
    },

    /// The requested object does not exist in the catalog.
    #[error("{operation}: table '{schema}.{table}' not found")]
    MissingTable {
        operation: CatalogOperation,
        schema: String,
        table: String,
    },
}

impl InspectError {
    /// Wrap a driver error with the operation that produced it.
    pub fn query(operation: CatalogOperation, source: sqlx::Error) -> Self {
        Self::Query { operation, source }
    }

    /// The operation this error is labelled with.
    pub fn operation(&self) -> CatalogOperation {
        match self {
            Self::Query { operation, .. }
            | Self::Decode { operation, .. }
            | Self::MissingTable { operation, .. } => *operation,
        }
    }
}
