//! In-memory catalog.
//!
//! Serves catalog rows from a value instead of a live database. Used for
//! offline runs against a JSON snapshot (`--snapshot catalog.json`) and by the
//! test suite.
//!
//! ```json
//! {
//!   "enums": [{ "schema": "public", "name": "mood", "value": "happy" }],
//!   "tables": [{
//!     "catalog": "app", "schema": "public", "name": "users",
//!     "columns": [{ "position": 1, "name": "id", "udt_name": "int8", "nullable": false }],
//!     "primary_key": ["id"]
//!   }]
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{CatalogOperation, InspectError, InspectResult};
use super::{CatalogInspector, ColumnRow, EnumRow, IndexRow, TableRow};

/// A table together with everything the inspector reports about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryTable {
    #[serde(default)]
    pub catalog: String,
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub indexes: Vec<IndexRow>,
}

impl MemoryTable {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: String::new(),
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Append a column; its position is the next ordinal.
    pub fn column(mut self, name: &str, udt_name: &str, nullable: bool) -> Self {
        let position = self.columns.len() as i32 + 1;
        self.columns.push(ColumnRow {
            position,
            name: name.to_string(),
            udt_name: udt_name.to_string(),
            nullable,
        });
        self
    }

    /// Set the primary key column names.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add an index.
    pub fn index<I, S>(mut self, name: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.push(IndexRow {
            name: name.to_string(),
            keys: keys.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryCatalog {
    #[serde(default)]
    pub enums: Vec<EnumRow>,
    #[serde(default)]
    pub tables: Vec<MemoryTable>,
    /// Operation that fails on every call.
    #[serde(skip)]
    fail_on: Option<CatalogOperation>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add an enum with its labels in order.
    pub fn with_enum(mut self, schema: &str, name: &str, values: &[&str]) -> Self {
        self.enums.extend(values.iter().map(|value| EnumRow {
            schema: schema.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        }));
        self
    }

    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Copy everything `inspector` reports about `schema`, plus all enums.
    pub async fn capture<I>(inspector: &I, schema: &str) -> InspectResult<Self>
    where
        I: CatalogInspector + ?Sized,
    {
        let mut catalog = Self {
            enums: inspector.enums().await?,
            ..Self::default()
        };

        for table in inspector.tables(schema).await? {
            let columns = inspector.columns(&table.schema, &table.name).await?;
            let primary_key = inspector.primary_key(&table.schema, &table.name).await?;
            let indexes = inspector.indexes(&table.schema, &table.name).await?;
            catalog.tables.push(MemoryTable {
                catalog: table.catalog,
                schema: table.schema,
                name: table.name,
                columns,
                primary_key,
                indexes,
            });
        }

        Ok(catalog)
    }

    /// Make every call of `operation` fail, for exercising error paths.
    pub fn failing_on(mut self, operation: CatalogOperation) -> Self {
        self.fail_on = Some(operation);
        self
    }

    fn check(&self, operation: CatalogOperation) -> InspectResult<()> {
        if self.fail_on == Some(operation) {
            return Err(InspectError::query(operation, sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn find(
        &self,
        operation: CatalogOperation,
        schema: &str,
        table: &str,
    ) -> InspectResult<&MemoryTable> {
        self.check(operation)?;
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == table)
            .ok_or_else(|| InspectError::MissingTable {
                operation,
                schema: schema.to_string(),
                table: table.to_string(),
            })
    }
}

#[async_trait]
impl CatalogInspector for MemoryCatalog {
    async fn enums(&self) -> InspectResult<Vec<EnumRow>> {
        self.check(CatalogOperation::Enums)?;
        Ok(self.enums.clone())
    }

    async fn tables(&self, schema: &str) -> InspectResult<Vec<TableRow>> {
        self.check(CatalogOperation::Tables)?;
        Ok(self
            .tables
            .iter()
            .filter(|t| t.schema == schema)
            .map(|t| TableRow {
                catalog: t.catalog.clone(),
                schema: t.schema.clone(),
                name: t.name.clone(),
            })
            .collect())
    }

    async fn columns(&self, schema: &str, table: &str) -> InspectResult<Vec<ColumnRow>> {
        Ok(self
            .find(CatalogOperation::Columns, schema, table)?
            .columns
            .clone())
    }

    async fn primary_key(&self, schema: &str, table: &str) -> InspectResult<Vec<String>> {
        Ok(self
            .find(CatalogOperation::PrimaryKey, schema, table)?
            .primary_key
            .clone())
    }

    async fn indexes(&self, schema: &str, table: &str) -> InspectResult<Vec<IndexRow>> {
        Ok(self
            .find(CatalogOperation::Indexes, schema, table)?
            .indexes
            .clone())
    }
}
