//! Type mapping registry.
//!
//! Maps raw Postgres type names (`udt_name`) onto the Rust types and
//! expression templates used by generated code. The registry is built once
//! per run: seeded with the built-in scalars, then extended with one entry per
//! enum discovered in the catalog. Enum registration must happen before any
//! column is resolved; an unregistered name is an error, never an empty
//! mapping.
//!
//! ```text
//! udt_name ──lookup──▶ TypeKind ──▶ storage type   "i32"
//!                               ──▶ decode(row, f) "row.try_get::<i32, _>(\"f\")?"
//!                               ──▶ encode(v)      "v"
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Enum;
use crate::naming;

/// Result type for registry operations.
pub type TypeMapResult<T> = Result<T, TypeMapError>;

/// Errors raised by the type registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeMapError {
    /// No mapping registered for the raw type name.
    #[error("no type mapping registered for '{0}'")]
    Unmapped(String),

    /// A mapping already exists for the raw type name.
    #[error("type mapping for '{0}' is already registered")]
    Duplicate(String),
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Text,
    Varchar,
    Bytea,
    Int2,
    Int4,
    Int8,
    Bool,
    Uuid,
    UuidArray,
    Timestamp,
    Timestamptz,
    Float4,
    Float8,
    Jsonb,
}

impl ScalarKind {
    /// All built-in scalars, in seeding order.
    pub const ALL: [ScalarKind; 14] = [
        ScalarKind::Text,
        ScalarKind::Varchar,
        ScalarKind::Bytea,
        ScalarKind::Int2,
        ScalarKind::Int4,
        ScalarKind::Int8,
        ScalarKind::Bool,
        ScalarKind::Uuid,
        ScalarKind::UuidArray,
        ScalarKind::Timestamp,
        ScalarKind::Timestamptz,
        ScalarKind::Float4,
        ScalarKind::Float8,
        ScalarKind::Jsonb,
    ];

    /// Catalog name of the type (`udt_name`).
    pub fn udt_name(&self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Varchar => "varchar",
            ScalarKind::Bytea => "bytea",
            ScalarKind::Int2 => "int2",
            ScalarKind::Int4 => "int4",
            ScalarKind::Int8 => "int8",
            ScalarKind::Bool => "bool",
            ScalarKind::Uuid => "uuid",
            ScalarKind::UuidArray => "_uuid",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Timestamptz => "timestamptz",
            ScalarKind::Float4 => "float4",
            ScalarKind::Float8 => "float8",
            ScalarKind::Jsonb => "jsonb",
        }
    }

    /// Rust type a value of this scalar is stored in.
    pub fn storage_type(&self) -> &'static str {
        match self {
            ScalarKind::Text | ScalarKind::Varchar => "String",
            // JSON is carried as raw bytes
            ScalarKind::Bytea | ScalarKind::Jsonb => "Vec<u8>",
            ScalarKind::Int2 => "i16",
            ScalarKind::Int4 => "i32",
            ScalarKind::Int8 => "i64",
            ScalarKind::Bool => "bool",
            ScalarKind::Uuid => "uuid::Uuid",
            ScalarKind::UuidArray => "Vec<uuid::Uuid>",
            ScalarKind::Timestamp => "chrono::NaiveDateTime",
            ScalarKind::Timestamptz => "chrono::DateTime<chrono::Utc>",
            ScalarKind::Float4 => "f32",
            ScalarKind::Float8 => "f64",
        }
    }
}

/// A registered type: either a built-in scalar or a discovered enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Scalar { scalar: ScalarKind },
    Enum { name: String, exported: String },
}

impl TypeKind {
    /// Rust storage type.
    pub fn storage_type(&self) -> String {
        match self {
            TypeKind::Scalar { scalar } => scalar.storage_type().to_string(),
            TypeKind::Enum { exported, .. } => exported.clone(),
        }
    }

    /// Expression reading the non-null `field` from the row expression `row`.
    pub fn decode(&self, row: &str, field: &str) -> String {
        self.decode_as(row, field, false)
    }

    /// Like [`TypeKind::decode`], producing an `Option` when `nullable`.
    pub fn decode_as(&self, row: &str, field: &str, nullable: bool) -> String {
        match (self, nullable) {
            (TypeKind::Scalar { scalar: ScalarKind::Jsonb }, false) => format!(
                "serde_json::to_vec(&{row}.try_get::<serde_json::Value, _>(\"{field}\")?)?"
            ),
            (TypeKind::Scalar { scalar: ScalarKind::Jsonb }, true) => format!(
                "{row}.try_get::<Option<serde_json::Value>, _>(\"{field}\")?\
                 .map(|v| serde_json::to_vec(&v)).transpose()?"
            ),
            (TypeKind::Scalar { scalar }, false) => {
                format!("{row}.try_get::<{}, _>(\"{field}\")?", scalar.storage_type())
            }
            (TypeKind::Scalar { scalar }, true) => format!(
                "{row}.try_get::<Option<{}>, _>(\"{field}\")?",
                scalar.storage_type()
            ),
            (TypeKind::Enum { exported, .. }, false) => {
                format!("{row}.try_get::<String, _>(\"{field}\")?.parse::<{exported}>()?")
            }
            (TypeKind::Enum { exported, .. }, true) => format!(
                "{row}.try_get::<Option<String>, _>(\"{field}\")?\
                 .map(|v| v.parse::<{exported}>()).transpose()?"
            ),
        }
    }

    /// Expression turning the non-null Rust value `value` into a bind parameter.
    pub fn encode(&self, value: &str) -> String {
        self.encode_as(value, false)
    }

    /// Like [`TypeKind::encode`], for an `Option` value when `nullable`.
    pub fn encode_as(&self, value: &str, nullable: bool) -> String {
        match self {
            TypeKind::Scalar { scalar } => match (scalar, nullable) {
                (ScalarKind::Text | ScalarKind::Varchar, false) => format!("{value}.as_str()"),
                (ScalarKind::Bytea, false) => format!("{value}.as_slice()"),
                (ScalarKind::UuidArray, false) => format!("&{value}[..]"),
                (ScalarKind::Text | ScalarKind::Varchar | ScalarKind::Bytea, true)
                | (ScalarKind::UuidArray, true) => format!("{value}.as_deref()"),
                (ScalarKind::Jsonb, false) => {
                    format!("serde_json::from_slice::<serde_json::Value>(&{value})?")
                }
                (ScalarKind::Jsonb, true) => format!(
                    "{value}.as_deref()\
                     .map(serde_json::from_slice::<serde_json::Value>)\
                     .transpose()?"
                ),
                _ => value.to_string(),
            },
            TypeKind::Enum { .. } if nullable => format!("{value}.as_ref().map(|v| v.as_str())"),
            TypeKind::Enum { .. } => format!("{value}.as_str()"),
        }
    }

    /// Whether this entry came from a discovered enum.
    pub fn is_enum(&self) -> bool {
        matches!(self, TypeKind::Enum { .. })
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Scalar { scalar } => write!(f, "{}", scalar.udt_name()),
            TypeKind::Enum { name, .. } => write!(f, "enum {}", name),
        }
    }
}

/// Per-run registry of raw type name → [`TypeKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    entries: BTreeMap<String, TypeKind>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry seeded with the built-in scalars.
    pub fn new() -> Self {
        let entries = ScalarKind::ALL
            .iter()
            .map(|scalar| {
                (
                    scalar.udt_name().to_string(),
                    TypeKind::Scalar { scalar: *scalar },
                )
            })
            .collect();
        Self { entries }
    }

    /// Register a discovered enum under its raw name.
    pub fn register_enum(&mut self, en: &Enum) -> TypeMapResult<()> {
        if self.entries.contains_key(&en.name) {
            return Err(TypeMapError::Duplicate(en.name.clone()));
        }
        self.entries.insert(
            en.name.clone(),
            TypeKind::Enum {
                name: en.name.clone(),
                exported: naming::exported_name(&en.name),
            },
        );
        Ok(())
    }

    /// Look up the mapping for a raw type name.
    pub fn lookup(&self, udt_name: &str) -> TypeMapResult<&TypeKind> {
        self.entries
            .get(udt_name)
            .ok_or_else(|| TypeMapError::Unmapped(udt_name.to_string()))
    }

    /// Whether a mapping exists for the raw type name.
    pub fn contains(&self, udt_name: &str) -> bool {
        self.entries.contains_key(udt_name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw names of all registered enums, sorted.
    pub fn enum_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, kind)| kind.is_enum())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
