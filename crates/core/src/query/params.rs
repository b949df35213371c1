use serde::{Deserialize, Serialize};

use crate::storage::SqlValue;

/// Sort value that asks the list operation to skip the count query.
pub const IGNORE_COUNT: &str = "ignore count";

/// One filter condition of a list or condition request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name; must be whitelisted for the entity.
    pub name: String,
    /// Comparison, defaults to `=`.
    #[serde(default)]
    pub exp: String,
    #[serde(default)]
    pub value: serde_json::Value,
    /// Joins this condition to the next one, defaults to `and`.
    #[serde(default)]
    pub logic: String,
}

/// Filter, sort and pagination parameters of a list request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Zero-based page number.
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    /// Comma-separated columns, `-` prefix for descending.
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Params {
    /// Returns true when the caller asked to skip the total count.
    pub fn skips_count(&self) -> bool {
        self.sort == IGNORE_COUNT
    }
}

/// Filter conditions without pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// A compiled `WHERE` fragment and its positional arguments.
///
/// An empty clause matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub clause: String,
    pub args: Vec<SqlValue>,
}

impl Filter {
    /// A filter that matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// A single `column = value` filter.
    pub fn eq(column: &str, value: impl Into<SqlValue>) -> Self {
        Self {
            clause: format!("{column} = ?"),
            args: vec![value.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// A compiled `ORDER BY`/`LIMIT`/`OFFSET` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub order: String,
    /// `None` returns every matching row.
    pub limit: Option<u32>,
    pub offset: u32,
}
