//! Database connection and statement execution.

use crate::{DbError, QueryResult, Value};
#[cfg(target_arch = "wasm32")]
use crate::Row;

/// SQLite database handle.
pub struct Db {
    #[cfg(target_arch = "wasm32")]
    conn: spin_sdk::sqlite::Connection,
    #[cfg(not(target_arch = "wasm32"))]
    _private: (),
}

#[cfg(target_arch = "wasm32")]
impl Db {
    /// Open the default SQLite database.
    pub fn open_default() -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open_default()
            .map_err(|e| DbError::Open(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open a named SQLite database.
    pub fn open(name: &str) -> Result<Self, DbError> {
        let conn =
            spin_sdk::sqlite::Connection::open(name).map_err(|e| DbError::Open(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Execute a statement that returns no rows (INSERT, UPDATE, DELETE,
    /// DDL).
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<(), DbError> {
        self.conn
            .execute(sql, to_spin_params(params).as_slice())
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    /// Execute a query and collect its rows.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let result = self
            .conn
            .execute(sql, to_spin_params(params).as_slice())
            .map_err(|e| DbError::Query(e.to_string()))?;

        let columns: Vec<String> = result.columns.iter().map(|c| c.to_string()).collect();
        let rows = result
            .rows
            .iter()
            .map(|row| {
                let values = row.values.iter().map(from_spin_value).collect();
                Row::new(columns.clone(), values)
            })
            .collect();

        Ok(QueryResult::new(rows))
    }

    /// Execute a query expected to match at most one row.
    pub fn query_optional(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, DbError> {
        Ok(self.query(sql, params)?.iter().next().cloned())
    }
}

#[cfg(target_arch = "wasm32")]
fn to_spin_params(params: &[Value]) -> Vec<spin_sdk::sqlite::Value> {
    params
        .iter()
        .map(|v| match v {
            Value::Null => spin_sdk::sqlite::Value::Null,
            Value::Integer(i) => spin_sdk::sqlite::Value::Integer(*i),
            Value::Real(f) => spin_sdk::sqlite::Value::Real(*f),
            Value::Text(s) => spin_sdk::sqlite::Value::Text(s.clone()),
            Value::Blob(b) => spin_sdk::sqlite::Value::Blob(b.clone()),
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn from_spin_value(v: &spin_sdk::sqlite::Value) -> Value {
    match v {
        spin_sdk::sqlite::Value::Null => Value::Null,
        spin_sdk::sqlite::Value::Integer(i) => Value::Integer(*i),
        spin_sdk::sqlite::Value::Real(f) => Value::Real(*f),
        spin_sdk::sqlite::Value::Text(s) => Value::Text(s.clone()),
        spin_sdk::sqlite::Value::Blob(b) => Value::Blob(b.clone()),
    }
}

// Native targets have no SQLite binding; every operation fails loudly.
// Tests run against the in-memory storage implementation instead.
#[cfg(not(target_arch = "wasm32"))]
impl Db {
    /// Open the default SQLite database.
    pub fn open_default() -> Result<Self, DbError> {
        Err(DbError::Unsupported)
    }

    /// Open a named SQLite database.
    pub fn open(_name: &str) -> Result<Self, DbError> {
        Err(DbError::Unsupported)
    }

    /// Execute a statement that returns no rows.
    pub fn execute(&self, _sql: &str, _params: &[Value]) -> Result<(), DbError> {
        Err(DbError::Unsupported)
    }

    /// Execute a query and collect its rows.
    pub fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult, DbError> {
        Err(DbError::Unsupported)
    }

    /// Execute a query expected to match at most one row.
    pub fn query_optional(
        &self,
        _sql: &str,
        _params: &[Value],
    ) -> Result<Option<crate::Row>, DbError> {
        Err(DbError::Unsupported)
    }
}
