//! Schema inspector.
//!
//! Issues read-only catalog queries and hands back raw rows. Nothing here
//! interprets the rows beyond decoding them; assembling tables, enums and
//! primary keys is the job of [`crate::model::builder`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CatalogInspector                           │
//! │  - enums()                      - columns(schema, table)        │
//! │  - tables(schema)               - primary_key(schema, table)    │
//! │                                 - indexes(schema, table)        │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                                   │
//!            ▼                                   ▼
//! ┌──────────────────────────┐       ┌──────────────────────────────┐
//! │  PgInspector (sqlx pool) │       │  MemoryCatalog (JSON / tests) │
//! └──────────────────────────┘       └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use schemata::catalog::{CatalogInspector, PgInspector};
//!
//! let pool = sqlx::PgPool::connect("postgres://localhost/app").await?;
//! let inspector = PgInspector::new(pool);
//!
//! let tables = inspector.tables("public").await?;
//! let columns = inspector.columns("public", &tables[0].name).await?;
//! ```

mod error;
mod memory;
mod postgres;

pub use error::{CatalogOperation, InspectError, InspectResult};
pub use memory::{MemoryCatalog, MemoryTable};
pub use postgres::PgInspector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One `(enum, label)` pair from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRow {
    /// Schema the enum type lives in.
    pub schema: String,
    /// Enum type name.
    pub name: String,
    /// One label of the enum.
    pub value: String,
}

/// A table in the inspected schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub catalog: String,
    pub schema: String,
    pub name: String,
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    /// Ordinal position (1-based).
    pub position: i32,
    pub name: String,
    /// Raw type name (`udt_name`).
    pub udt_name: String,
    pub nullable: bool,
}

/// An index and its key expressions, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    pub name: String,
    /// Column names for plain keys, the expression text otherwise.
    pub keys: Vec<String>,
}

/// Read-only access to a database catalog.
///
/// Implementations only shape queries and decode rows. Every failure is
/// reported as an [`InspectError`] labelled with the operation that failed.
#[async_trait]
pub trait CatalogInspector: Send + Sync {
    /// Every enum label in the catalog, one row per label.
    async fn enums(&self) -> InspectResult<Vec<EnumRow>>;

    /// Tables in `schema`.
    async fn tables(&self, schema: &str) -> InspectResult<Vec<TableRow>>;

    /// Columns of `schema.table`.
    async fn columns(&self, schema: &str, table: &str) -> InspectResult<Vec<ColumnRow>>;

    /// Names of the columns forming the primary key of `schema.table`.
    ///
    /// Empty when the table has no primary key.
    async fn primary_key(&self, schema: &str, table: &str) -> InspectResult<Vec<String>>;

    /// Indexes defined on `schema.table`.
    async fn indexes(&self, schema: &str, table: &str) -> InspectResult<Vec<IndexRow>>;
}
