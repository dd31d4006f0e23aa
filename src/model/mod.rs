//! Schema metadata model.
//!
//! The entity graph assembled from catalog rows: [`Table`]s owning ordered
//! [`Column`]s, with primary keys and indexes resolved, plus the schema's
//! [`Enum`]s. Everything here is built once by [`builder::build_schema`] and
//! read-only afterwards.
//!
//! Names and types are derived lazily through accessor methods. Type accessors
//! take the run's [`TypeRegistry`] explicitly, so a column can only be typed
//! against a registry that already knows the schema's enums.

pub mod builder;

pub use builder::{build_schema, group_enums, BuildError, BuildResult};

use serde::{Deserialize, Serialize};

use crate::naming;
use crate::types::{TypeKind, TypeMapResult, TypeRegistry};

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Ordinal position (1-based), unique within the table.
    pub position: i32,
    pub name: String,
    /// Raw type name (`udt_name`).
    pub udt_name: String,
    pub nullable: bool,
    pub is_primary_key: bool,
}

impl Column {
    pub fn exported_name(&self) -> String {
        naming::exported_name(&self.name)
    }

    pub fn camel_name(&self) -> String {
        naming::camel_name(&self.name)
    }

    /// Registry entry for this column's raw type.
    pub fn type_kind<'r>(&self, registry: &'r TypeRegistry) -> TypeMapResult<&'r TypeKind> {
        registry.lookup(&self.udt_name)
    }

    /// Rust type of the column, wrapped in `Option` when nullable.
    pub fn storage_type(&self, registry: &TypeRegistry) -> TypeMapResult<String> {
        let storage = self.type_kind(registry)?.storage_type();
        if self.nullable {
            Ok(format!("Option<{}>", storage))
        } else {
            Ok(storage)
        }
    }

    /// Expression reading this column from the row expression `row`.
    pub fn decode(&self, registry: &TypeRegistry, row: &str) -> TypeMapResult<String> {
        Ok(self
            .type_kind(registry)?
            .decode_as(row, &self.name, self.nullable))
    }

    /// Expression binding the Rust value `value` as this column's parameter.
    pub fn encode(&self, registry: &TypeRegistry, value: &str) -> TypeMapResult<String> {
        Ok(self.type_kind(registry)?.encode_as(value, self.nullable))
    }
}

/// A named index and its key columns, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<Column>,
}

/// A table of the inspected schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub catalog: String,
    pub schema: String,
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Primary key columns, in column declaration order.
    pub primary_keys: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl Table {
    /// Build a table from its columns.
    ///
    /// Columns are ordered by position and the primary key is derived from the
    /// `is_primary_key` flags, so the two can never disagree.
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        mut columns: Vec<Column>,
    ) -> Self {
        columns.sort_by_key(|c| c.position);
        let primary_keys = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .cloned()
            .collect();

        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            name: name.into(),
            columns,
            primary_keys,
            indexes: Vec::new(),
        }
    }

    pub fn exported_name(&self) -> String {
        naming::exported_name(&self.name)
    }

    pub fn camel_name(&self) -> String {
        naming::camel_name(&self.name)
    }

    pub fn short_name(&self) -> String {
        naming::short_name(&self.name)
    }

    /// Column with the exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_keys.is_empty()
    }

    /// Index with the given name.
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

/// An enumerated type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    pub schema: String,
    pub name: String,
    /// Labels in catalog order.
    pub values: Vec<String>,
}

impl Enum {
    pub fn exported_name(&self) -> String {
        naming::exported_name(&self.name)
    }

    pub fn short_name(&self) -> String {
        naming::short_name(&self.name)
    }

    /// `(label, exported variant name)` pairs, in label order.
    pub fn variants(&self) -> Vec<(&str, String)> {
        self.values
            .iter()
            .map(|value| (value.as_str(), naming::exported_name(value)))
            .collect()
    }
}

/// Everything inspected from one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub enums: Vec<Enum>,
    pub tables: Vec<Table>,
}

impl Schema {
    /// Table with the exact name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Enum with the exact name.
    pub fn enum_type(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }
}
