//! Query executor contract and its SQLite implementation.
//!
//! # Responsibility
//! - Accept a parameterized statement plus positional bound values.
//! - Return rows as ordered column-name/primitive-value pairs.
//!
//! # Invariants
//! - Values are always bound through parameters, never spliced into SQL.
//! - Store errors are returned unmodified; no retry happens here.

use super::DbResult;
use crate::model::row::RowMapError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// One result row as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRow {
    columns: Vec<(String, Value)>,
}

impl StoreRow {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Raw value for `column`, if the executor returned it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    fn require(&self, column: &'static str) -> Result<&Value, RowMapError> {
        self.get(column).ok_or(RowMapError::MissingColumn(column))
    }

    pub fn get_i64(&self, column: &'static str) -> Result<i64, RowMapError> {
        match self.require(column)? {
            Value::Integer(value) => Ok(*value),
            other => Err(RowMapError::type_mismatch(column, "integer", other)),
        }
    }

    pub fn get_text(&self, column: &'static str) -> Result<String, RowMapError> {
        match self.require(column)? {
            Value::Text(value) => Ok(value.clone()),
            other => Err(RowMapError::type_mismatch(column, "text", other)),
        }
    }

    /// Nullable text column; SQL `NULL` maps to `None`.
    pub fn get_opt_text(&self, column: &'static str) -> Result<Option<String>, RowMapError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Text(value) => Ok(Some(value.clone())),
            other => Err(RowMapError::type_mismatch(column, "text or null", other)),
        }
    }
}

/// Executes parameterized statements against the relational store.
///
/// Implementations own timeouts and connection management; callers only
/// suspend while waiting on the result.
pub trait QueryExecutor {
    /// Runs a row-returning statement (`SELECT`, or a write with `RETURNING`).
    fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<StoreRow>>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize>;
}

impl QueryExecutor for Connection {
    fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<StoreRow>> {
        let mut stmt = self.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut columns = Vec::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                columns.push((name.clone(), row.get::<_, Value>(index)?));
            }
            result.push(StoreRow::new(columns));
        }

        Ok(result)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        let changed = Connection::execute(self, sql, params_from_iter(params.iter()))?;
        Ok(changed)
    }
}
