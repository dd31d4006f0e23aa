//! Query definitions: the human-written input to the resolver.
//!
//! Definitions are read from TOML:
//!
//! ```toml
//! [[query]]
//! name = "ListRecentOrders"
//! table = "orders"
//! fields = ["customer_id", "created_at:gteq"]
//! sort = ["-created_at"]
//! return = "paged"
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A document of query definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefinitions {
    #[serde(default)]
    pub query: Vec<QueryDefinition>,
}

impl QueryDefinitions {
    /// Parse a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn len(&self) -> usize {
        self.query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
}

/// One declared query, unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub name: String,
    pub table: String,
    /// Filter specs: `"column"` or `"column:op"`.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Sort specs: `"column"` or `"-column"` for descending.
    #[serde(default)]
    pub sort: Vec<String>,
    /// `"one"`, `"many"`, `"paged"`, or absent.
    #[serde(default, rename = "return")]
    pub return_mode: Option<String>,
}

impl QueryDefinition {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            sort: Vec::new(),
            return_mode: None,
        }
    }

    pub fn field(mut self, spec: impl Into<String>) -> Self {
        self.fields.push(spec.into());
        self
    }

    pub fn sort(mut self, spec: impl Into<String>) -> Self {
        self.sort.push(spec.into());
        self
    }

    pub fn returns(mut self, mode: impl Into<String>) -> Self {
        self.return_mode = Some(mode.into());
        self
    }
}

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lteq,
    Gt,
    Gteq,
}

impl FilterOp {
    /// SQL comparison operator.
    pub fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Lt => "<",
            FilterOp::Lteq => "<=",
            FilterOp::Gt => ">",
            FilterOp::Gteq => ">=",
        }
    }

    /// Range and inequality operators can match more than one row.
    pub fn could_match_many(&self) -> bool {
        !matches!(self, FilterOp::Eq | FilterOp::Ne)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Lt => "lt",
            FilterOp::Lteq => "lteq",
            FilterOp::Gt => "gt",
            FilterOp::Gteq => "gteq",
        }
    }
}

impl FromStr for FilterOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(FilterOp::Eq),
            "ne" => Ok(FilterOp::Ne),
            "lt" => Ok(FilterOp::Lt),
            "lteq" => Ok(FilterOp::Lteq),
            "gt" => Ok(FilterOp::Gt),
            "gteq" => Ok(FilterOp::Gteq),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared return mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMode {
    One,
    Many,
    Paged,
}

impl FromStr for ReturnMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one" => Ok(ReturnMode::One),
            "many" => Ok(ReturnMode::Many),
            "paged" => Ok(ReturnMode::Paged),
            other => Err(other.to_string()),
        }
    }
}

/// A parsed `"column[:op]"` spec. The operator defaults to `eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec<'a> {
    pub column: &'a str,
    pub op: Result<FilterOp, &'a str>,
}

impl<'a> FieldSpec<'a> {
    pub fn parse(spec: &'a str) -> Self {
        match spec.split_once(':') {
            Some((column, op)) => Self {
                column,
                op: op.parse().map_err(|_| op),
            },
            None => Self {
                column: spec,
                op: Ok(FilterOp::Eq),
            },
        }
    }
}

/// A parsed `"[-]column"` spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<'a> {
    pub column: &'a str,
    pub descending: bool,
}

impl<'a> SortSpec<'a> {
    pub fn parse(spec: &'a str) -> Self {
        match spec.strip_prefix('-') {
            Some(column) => Self {
                column,
                descending: true,
            },
            None => Self {
                column: spec,
                descending: false,
            },
        }
    }
}
