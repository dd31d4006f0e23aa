//! Query definition processing.
//!
//! Compiles the small query DSL (`fields`, `sort`, `return`) into resolved
//! [`Query`] descriptors against a built [`Schema`](crate::model::Schema).
//!
//! ```text
//! QueryDefinition { table: "orders", fields: ["total:gt"], sort: ["-created_at"] }
//!        │
//!        ▼ resolve_queries
//! Query { table: orders, filters: [total >], sorts: [created_at DESC],
//!         return_many: true }
//! ```
//!
//! One `Get<Table>` lookup by primary key is synthesized for every table.

mod definition;
mod error;
mod resolve;

pub use definition::{FieldSpec, FilterOp, QueryDefinition, QueryDefinitions, ReturnMode, SortSpec};
pub use error::{ResolveError, ResolveErrors, SpecKind};
pub use resolve::{primary_key_query, resolve_queries};

use serde::{Deserialize, Serialize};

use crate::model::{Column, Table};
use crate::naming;

/// A filter: `column <op> $n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: Column,
    pub op: FilterOp,
}

impl Filter {
    /// SQL comparison operator.
    pub fn sql_op(&self) -> &'static str {
        self.op.sql()
    }
}

/// An `ORDER BY` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub column: Column,
    pub descending: bool,
}

impl Sort {
    /// `ASC` or `DESC`.
    pub fn keyword(&self) -> &'static str {
        if self.descending {
            "DESC"
        } else {
            "ASC"
        }
    }
}

/// How many rows a query yields, after precedence is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Paged,
    Many,
    /// No flag set: neither declared nor inferred.
    Unspecified,
}

/// A resolved query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub name: String,
    pub table: Table,
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub return_one: bool,
    pub return_many: bool,
    pub paged: bool,
    /// Generated from a primary key rather than declared.
    #[serde(default)]
    pub synthetic: bool,
}

impl Query {
    pub fn exported_name(&self) -> String {
        naming::exported_name(&self.name)
    }

    /// Effective cardinality.
    ///
    /// The flags are not exclusive: a `return = "one"` query with a range
    /// filter has both `return_one` and `return_many` set. An explicit
    /// `one` wins, then `paged`, then `many`.
    pub fn cardinality(&self) -> Cardinality {
        if self.return_one {
            Cardinality::One
        } else if self.paged {
            Cardinality::Paged
        } else if self.return_many {
            Cardinality::Many
        } else {
            Cardinality::Unspecified
        }
    }

    /// A query with no filters matches every row of its table.
    pub fn matches_all_rows(&self) -> bool {
        self.filters.is_empty()
    }
}
