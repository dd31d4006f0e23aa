//! Postgres catalog inspector backed by an `sqlx` pool.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use super::error::{CatalogOperation, InspectError, InspectResult};
use super::{CatalogInspector, ColumnRow, EnumRow, IndexRow, TableRow};

const QUERY_ENUMS: &str = r#"
SELECT
  n.nspname::text   AS enum_schema,
  t.typname::text   AS enum_name,
  e.enumlabel::text AS enum_value
FROM pg_type t
  JOIN pg_enum e ON t.oid = e.enumtypid
  JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
ORDER BY n.nspname, t.typname, e.enumsortorder
"#;

const QUERY_TABLES: &str = r#"
SELECT
  table_catalog::text AS table_catalog,
  table_schema::text  AS table_schema,
  table_name::text    AS table_name
FROM information_schema.tables
WHERE table_schema = $1
ORDER BY table_name
"#;

const QUERY_COLUMNS: &str = r#"
SELECT
  ordinal_position::int4 AS ordinal_position,
  column_name::text      AS column_name,
  udt_name::text         AS udt_name,
  is_nullable::text      AS is_nullable
FROM information_schema.columns
WHERE table_schema = $1
  AND table_name   = $2
ORDER BY ordinal_position
"#;

const QUERY_PRIMARY_KEY: &str = r#"
SELECT
  a.attname::text AS column_name
FROM pg_index i
  JOIN pg_class c ON c.oid = i.indrelid
  JOIN pg_namespace n ON n.oid = c.relnamespace
  JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = ANY(i.indkey)
WHERE n.nspname = $1
  AND c.relname = $2
  AND i.indisprimary
"#;

const QUERY_INDEXES: &str = r#"
SELECT
  ic.relname::text AS index_name,
  ARRAY(
    SELECT CASE
      WHEN i.indkey[k] <> 0 THEN (
        SELECT a.attname::text
        FROM pg_attribute a
        WHERE a.attrelid = i.indrelid AND a.attnum = i.indkey[k]
      )
      ELSE pg_get_indexdef(i.indexrelid, k + 1, TRUE)
    END
    FROM generate_subscripts(i.indkey, 1) AS k
    ORDER BY k
  )::text[] AS index_keys
FROM pg_index i
  JOIN pg_class ic ON ic.oid = i.indexrelid
  JOIN pg_class c ON c.oid = i.indrelid
  JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1
  AND c.relname = $2
ORDER BY ic.relname
"#;

/// Catalog inspector for a live Postgres database.
///
/// The pool is supplied by the caller; the inspector never opens or closes
/// connections itself and only issues `SELECT`s.
pub struct PgInspector {
    pool: PgPool,
}

impl PgInspector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch(
        &self,
        operation: CatalogOperation,
        sql: &'static str,
        binds: &[&str],
    ) -> InspectResult<Vec<PgRow>> {
        let mut query = sqlx::query(sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| InspectError::query(operation, e))
    }
}

fn get<'r, T>(row: &'r PgRow, operation: CatalogOperation, column: &str) -> InspectResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| InspectError::query(operation, e))
}

/// `information_schema` reports nullability as `YES` / `NO`.
fn parse_nullable(value: &str) -> InspectResult<bool> {
    match value {
        "YES" => Ok(true),
        "NO" => Ok(false),
        other => Err(InspectError::Decode {
            operation: CatalogOperation::Columns,
            column: "is_nullable".to_string(),
            value: other.to_string(),
        }),
    }
}

#[async_trait]
impl CatalogInspector for PgInspector {
    async fn enums(&self) -> InspectResult<Vec<EnumRow>> {
        let op = CatalogOperation::Enums;
        let rows = self.fetch(op, QUERY_ENUMS, &[]).await?;

        rows.iter()
            .map(|row| -> InspectResult<_> {
                Ok(EnumRow {
                    schema: get(row, op, "enum_schema")?,
                    name: get(row, op, "enum_name")?,
                    value: get(row, op, "enum_value")?,
                })
            })
            .collect()
    }

    async fn tables(&self, schema: &str) -> InspectResult<Vec<TableRow>> {
        let op = CatalogOperation::Tables;
        let rows = self.fetch(op, QUERY_TABLES, &[schema]).await?;

        rows.iter()
            .map(|row| -> InspectResult<_> {
                Ok(TableRow {
                    catalog: get(row, op, "table_catalog")?,
                    schema: get(row, op, "table_schema")?,
                    name: get(row, op, "table_name")?,
                })
            })
            .collect()
    }

    async fn columns(&self, schema: &str, table: &str) -> InspectResult<Vec<ColumnRow>> {
        let op = CatalogOperation::Columns;
        let rows = self.fetch(op, QUERY_COLUMNS, &[schema, table]).await?;

        rows.iter()
            .map(|row| -> InspectResult<_> {
                let nullable: String = get(row, op, "is_nullable")?;
                Ok(ColumnRow {
                    position: get(row, op, "ordinal_position")?,
                    name: get(row, op, "column_name")?,
                    udt_name: get(row, op, "udt_name")?,
                    nullable: parse_nullable(&nullable)?,
                })
            })
            .collect()
    }

    async fn primary_key(&self, schema: &str, table: &str) -> InspectResult<Vec<String>> {
        let op = CatalogOperation::PrimaryKey;
        let rows = self.fetch(op, QUERY_PRIMARY_KEY, &[schema, table]).await?;

        rows.iter().map(|row| get(row, op, "column_name")).collect()
    }

    async fn indexes(&self, schema: &str, table: &str) -> InspectResult<Vec<IndexRow>> {
        let op = CatalogOperation::Indexes;
        let rows = self.fetch(op, QUERY_INDEXES, &[schema, table]).await?;

        rows.iter()
            .map(|row| -> InspectResult<_> {
                Ok(IndexRow {
                    name: get(row, op, "index_name")?,
                    keys: get(row, op, "index_keys")?,
                })
            })
            .collect()
    }
}
