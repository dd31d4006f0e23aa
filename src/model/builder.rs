//! Metadata model builder.
//!
//! Turns catalog rows into a [`Schema`]. The order of work matters:
//!
//! 1. enums are grouped and registered into the run's [`TypeRegistry`],
//! 2. tables are fetched, each with its columns, primary key and indexes,
//! 3. every column's raw type is checked against the registry.
//!
//! Step 3 only succeeds because step 1 ran first: a column typed with an enum
//! resolves to the enum's generated type, never to a scalar fallback.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info};

use super::{Column, Enum, Index, Schema, Table};
use crate::catalog::{CatalogInspector, ColumnRow, EnumRow, IndexRow, InspectError, TableRow};
use crate::types::{TypeMapError, TypeRegistry};

/// Result type for model building.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while building the model.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error("registering enum: {0}")]
    Registry(#[from] TypeMapError),

    /// A column's raw type has no registry entry.
    #[error("column '{table}.{column}' has unmapped type '{udt_name}'")]
    UnmappedType {
        table: String,
        column: String,
        udt_name: String,
    },

    /// Two columns of one table report the same ordinal position.
    #[error("table '{table}' has more than one column at position {position}")]
    DuplicatePosition { table: String, position: i32 },

    /// Two tables of the schema share a name.
    #[error("duplicate table name '{0}'")]
    DuplicateTable(String),
}

/// Group enum rows by enum name.
///
/// Enums appear in first-seen order; each enum's labels keep their row order.
/// Grouping is by name alone: an enum name reused in another schema adds its
/// labels to the first one, which keeps the first schema.
pub fn group_enums(rows: Vec<EnumRow>) -> Vec<Enum> {
    let mut enums: Vec<Enum> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.name.clone()).or_insert_with(|| {
            enums.push(Enum {
                schema: row.schema.clone(),
                name: row.name.clone(),
                values: Vec::new(),
            });
            enums.len() - 1
        });
        let en = &mut enums[slot];
        if en.schema != row.schema {
            debug!(
                name = %en.name,
                schema = %en.schema,
                other_schema = %row.schema,
                value = %row.value,
                "enum name reused in another schema; merging labels"
            );
        }
        en.values.push(row.value);
    }

    enums
}

/// Inspect `schema` and build its model, registering its enums in `registry`.
pub async fn build_schema<I>(
    inspector: &I,
    schema: &str,
    registry: &mut TypeRegistry,
) -> BuildResult<Schema>
where
    I: CatalogInspector + ?Sized,
{
    let enums = group_enums(inspector.enums().await?);
    for en in &enums {
        registry.register_enum(en)?;
        debug!(name = %en.name, values = en.values.len(), "registered enum");
    }

    let mut tables = Vec::new();
    let mut seen = HashSet::new();
    for row in inspector.tables(schema).await? {
        if !seen.insert(row.name.clone()) {
            return Err(BuildError::DuplicateTable(row.name));
        }
        tables.push(build_table(inspector, row).await?);
    }

    for table in &tables {
        check_column_types(table, registry)?;
    }

    info!(
        schema,
        enums = enums.len(),
        tables = tables.len(),
        "built schema model"
    );

    Ok(Schema {
        name: schema.to_string(),
        enums,
        tables,
    })
}

async fn build_table<I>(inspector: &I, row: TableRow) -> BuildResult<Table>
where
    I: CatalogInspector + ?Sized,
{
    let column_rows = inspector.columns(&row.schema, &row.name).await?;
    let pk_names = inspector.primary_key(&row.schema, &row.name).await?;
    let columns = assemble_columns(&row.name, column_rows, &pk_names)?;

    let mut table = Table::new(row.catalog, row.schema, row.name, columns);
    let index_rows = inspector.indexes(&table.schema, &table.name).await?;
    table.indexes = resolve_indexes(&table, index_rows);

    debug!(
        table = %table.name,
        columns = table.columns.len(),
        primary_keys = table.primary_keys.len(),
        indexes = table.indexes.len(),
        "built table"
    );
    Ok(table)
}

/// Turn column rows into columns, flagging primary key members.
fn assemble_columns(
    table: &str,
    rows: Vec<ColumnRow>,
    pk_names: &[String],
) -> BuildResult<Vec<Column>> {
    let mut positions = HashSet::new();
    let mut columns = Vec::with_capacity(rows.len());

    for row in rows {
        if !positions.insert(row.position) {
            return Err(BuildError::DuplicatePosition {
                table: table.to_string(),
                position: row.position,
            });
        }
        columns.push(Column {
            is_primary_key: pk_names.iter().any(|pk| *pk == row.name),
            position: row.position,
            name: row.name,
            udt_name: row.udt_name,
            nullable: row.nullable,
        });
    }

    Ok(columns)
}

/// Resolve index keys to columns. Indexes over expressions are skipped.
fn resolve_indexes(table: &Table, rows: Vec<IndexRow>) -> Vec<Index> {
    rows.into_iter()
        .filter_map(|row| {
            let columns: Option<Vec<Column>> = row
                .keys
                .iter()
                .map(|key| key_column(table, key).cloned())
                .collect();
            match columns {
                Some(columns) => Some(Index {
                    name: row.name,
                    columns,
                }),
                None => {
                    debug!(table = %table.name, index = %row.name, "skipping expression index");
                    None
                }
            }
        })
        .collect()
}

/// Column named by an index key. The catalog quotes names that need it
/// (`"order"`, `"CamelCase"`).
fn key_column<'t>(table: &'t Table, key: &str) -> Option<&'t Column> {
    table
        .column(key)
        .or_else(|| unquote_identifier(key).and_then(|name| table.column(&name)))
}

/// `"na""me"` → `na"me`; `None` unless `key` is a single quoted identifier.
fn unquote_identifier(key: &str) -> Option<String> {
    let inner = key.strip_prefix('"')?.strip_suffix('"')?;
    if inner.is_empty() || inner.replace("\"\"", "").contains('"') {
        return None;
    }
    Some(inner.replace("\"\"", "\""))
}

fn check_column_types(table: &Table, registry: &TypeRegistry) -> BuildResult<()> {
    for column in &table.columns {
        if column.type_kind(registry).is_err() {
            return Err(BuildError::UnmappedType {
                table: table.name.clone(),
                column: column.name.clone(),
                udt_name: column.udt_name.clone(),
            });
        }
    }
    Ok(())
}
