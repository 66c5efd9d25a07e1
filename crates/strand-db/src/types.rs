//! SQL value and row types.

use crate::DbError;
use serde::{Deserialize, Serialize};

/// A SQLite value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, if it is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Check for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Integer(i64::from(b))
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// One result row, addressable by column name.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from parallel column/value lists.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Raw value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Required text column.
    pub fn text(&self, column: &str) -> Result<&str, DbError> {
        self.get(column)
            .and_then(Value::as_text)
            .ok_or_else(|| DbError::Column(format!("missing text column: {column}")))
    }

    /// Optional text column (NULL becomes `None`).
    pub fn opt_text(&self, column: &str) -> Result<Option<&str>, DbError> {
        match self.get(column) {
            None => Err(DbError::Column(format!("missing column: {column}"))),
            Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_text()
                .map(Some)
                .ok_or_else(|| DbError::Column(format!("column is not text: {column}"))),
        }
    }

    /// Required integer column.
    pub fn integer(&self, column: &str) -> Result<i64, DbError> {
        self.get(column)
            .and_then(Value::as_integer)
            .ok_or_else(|| DbError::Column(format!("missing integer column: {column}")))
    }

    /// Optional integer column (NULL becomes `None`).
    pub fn opt_integer(&self, column: &str) -> Result<Option<i64>, DbError> {
        match self.get(column) {
            None => Err(DbError::Column(format!("missing column: {column}"))),
            Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_integer()
                .map(Some)
                .ok_or_else(|| DbError::Column(format!("column is not an integer: {column}"))),
        }
    }

    /// Boolean column stored as 0/1.
    pub fn boolean(&self, column: &str) -> Result<bool, DbError> {
        Ok(self.integer(column)? != 0)
    }
}

/// The rows returned by a query.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    rows: Vec<Row>,
}

impl QueryResult {
    /// Create a result set.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// The first row, if any.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check for an empty result.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
