//! Resolution errors.

use std::fmt;

use thiserror::Error;

/// Which part of a definition referenced an unknown column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Filter,
    Sort,
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecKind::Filter => f.write_str("filter"),
            SpecKind::Sort => f.write_str("sort"),
        }
    }
}

/// A query definition that cannot be resolved against the model.
///
/// Every variant names the offending definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("query '{query}': unknown table '{table}'")]
    UnknownTable { query: String, table: String },

    #[error("query '{query}': {kind} '{spec}' matches no column of table '{table}'")]
    UnknownColumn {
        query: String,
        table: String,
        kind: SpecKind,
        spec: String,
    },

    #[error("query '{query}': unknown operator '{op}' in filter '{spec}'")]
    UnknownOperator {
        query: String,
        spec: String,
        op: String,
    },

    #[error("query '{query}': unknown return mode '{mode}' (expected one, many or paged)")]
    UnknownReturnMode { query: String, mode: String },

    #[error("query '{0}' is defined more than once")]
    DuplicateQuery(String),
}

impl ResolveError {
    /// Name of the definition this error belongs to.
    pub fn query(&self) -> &str {
        match self {
            ResolveError::UnknownTable { query, .. }
            | ResolveError::UnknownColumn { query, .. }
            | ResolveError::UnknownOperator { query, .. }
            | ResolveError::UnknownReturnMode { query, .. } => query,
            ResolveError::DuplicateQuery(query) => query,
        }
    }
}

/// All errors from one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveErrors(pub Vec<ResolveError>);

impl fmt::Display for ResolveErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid query definition(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolveErrors {}

impl From<Vec<ResolveError>> for ResolveErrors {
    fn from(errors: Vec<ResolveError>) -> Self {
        Self(errors)
    }
}
