//! End-to-end resolution from a live catalog to query descriptors.
//!
//! ```text
//! Catalog → Inspect → Build model (register enums) → Check column types
//!         → Resolve query definitions → Generation
//! ```
//!
//! The resulting [`Generation`] is what the emission stage consumes. Every
//! step is fail-fast: a catalog error, an unmapped column type or an invalid
//! definition aborts the run with nothing produced.
//!
//! # Example
//!
//! ```ignore
//! use schemata::catalog::PgInspector;
//! use schemata::generate::{generate, GenerateOptions};
//! use schemata::query::QueryDefinitions;
//!
//! let inspector = PgInspector::new(pool);
//! let definitions = QueryDefinitions::from_toml(&source)?;
//!
//! let generation = generate(&inspector, &definitions, GenerateOptions::default()).await?;
//! for query in &generation.queries {
//!     println!("{} -> {:?}", query.exported_name(), query.cardinality());
//! }
//! ```

use serde::Serialize;
use tracing::info;

use crate::catalog::CatalogInspector;
use crate::model::{build_schema, BuildError, Enum, Schema, Table};
use crate::query::{resolve_queries, Query, QueryDefinitions, ResolveErrors};
use crate::types::TypeRegistry;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("inspecting schema: {0}")]
    Build(#[from] BuildError),

    #[error("resolving queries: {0}")]
    Resolve(#[from] ResolveErrors),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

// ============================================================================
// Options
// ============================================================================

/// Options for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Schema to inspect.
    pub schema: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
        }
    }
}

impl GenerateOptions {
    /// Set the schema to inspect.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Everything the emission stage needs, read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub schema: String,
    /// Type registry of this run, including discovered enums.
    pub types: TypeRegistry,
    pub enums: Vec<Enum>,
    pub tables: Vec<Table>,
    pub queries: Vec<Query>,
}

impl Generation {
    /// Query with the exact name.
    pub fn query(&self, name: &str) -> Option<&Query> {
        self.queries.iter().find(|q| q.name == name)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Inspect the schema and build its model with a fresh type registry.
pub async fn inspect<I>(
    inspector: &I,
    options: &GenerateOptions,
) -> GenerateResult<(Schema, TypeRegistry)>
where
    I: CatalogInspector + ?Sized,
{
    let mut registry = TypeRegistry::new();
    let schema = build_schema(inspector, &options.schema, &mut registry).await?;
    Ok((schema, registry))
}

/// Run the whole pipeline.
pub async fn generate<I>(
    inspector: &I,
    definitions: &QueryDefinitions,
    options: GenerateOptions,
) -> GenerateResult<Generation>
where
    I: CatalogInspector + ?Sized,
{
    let (schema, types) = inspect(inspector, &options).await?;
    let queries = resolve_queries(definitions, &schema)?;

    info!(
        schema = %schema.name,
        queries = queries.len(),
        "generation ready"
    );

    Ok(Generation {
        schema: schema.name,
        types,
        enums: schema.enums,
        tables: schema.tables,
        queries,
    })
}
