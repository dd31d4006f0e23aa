//! # schemata
//!
//! Postgres schema introspection for typed data-access code generation.
//!
//! ## Architecture
//!
//! Schemata reads a live catalog into an in-memory model and compiles a small
//! query DSL against it:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Postgres catalog (information_schema)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Raw rows (enums, tables, columns, keys, indexes)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model::builder] + [types]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Schema (tables, columns, enums) + TypeRegistry      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query]  ◄── query definitions (TOML)
//! ┌─────────────────────────────────────────────────────────┐
//! │          Resolved queries (filters, sorts, arity)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are converted to exported names by [`naming`] throughout.
//! [`generate`] runs the whole pipeline in one call.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod model;
pub mod naming;
pub mod query;
pub mod types;

pub use generate::{generate, GenerateError, GenerateOptions, Generation};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{CatalogInspector, MemoryCatalog, MemoryTable, PgInspector};
    pub use crate::generate::{generate, GenerateOptions, Generation};
    pub use crate::model::{build_schema, Column, Enum, Index, Schema, Table};
    pub use crate::naming::{camel_name, exported_name, short_name};
    pub use crate::query::{resolve_queries, Cardinality, Query, QueryDefinition, QueryDefinitions};
    pub use crate::types::{TypeKind, TypeRegistry};
}
