//! Generic repository shared by every entity table.
//!
//! # Responsibility
//! - Provide `find_by_id`/`create`/`update`/`delete` for any `Entity`.
//! - Stay agnostic of which columns a table has: callers hand in a
//!   `ColumnSet` and the statement covers exactly those columns.
//!
//! # Invariants
//! - Primary keys and timestamps are assigned by the store.
//! - An update with no columns issues no statement.

use crate::db::{DbError, QueryExecutor};
use crate::model::row::{Entity, FromStoreRow, RowMapError};
use crate::model::EntityId;
use log::debug;
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

/// Store-side clock expression used for `updated_at` on every update.
pub const STORE_NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error: executor failures or rows that cannot be mapped.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Mapping(RowMapError),
    /// A write with `RETURNING` came back without a row.
    MissingReturnedRow(&'static str),
}

impl RepoError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "invalid persisted data: {err}"),
            Self::MissingReturnedRow(table) => {
                write!(f, "write on `{table}` returned no row")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Mapping(err) => Some(err),
            Self::MissingReturnedRow(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RowMapError> for RepoError {
    fn from(value: RowMapError) -> Self {
        Self::Mapping(value)
    }
}

/// Typed set of column assignments for an insert or update.
///
/// Implemented by per-entity creatable/changes structs so only known
/// columns can reach statement construction.
pub trait ColumnSet {
    fn columns(&self) -> Vec<(&'static str, Value)>;
}

/// `INSERT INTO t (a, b) VALUES (?1, ?2) RETURNING *;`
pub fn build_insert_sql(table: &str, columns: &[&str]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {table} DEFAULT VALUES RETURNING *;");
    }

    let placeholders: Vec<String> = (1..=columns.len()).map(|index| format!("?{index}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING *;",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `UPDATE t SET a = ?1, updated_at = <now> WHERE id = ?2 RETURNING *;`
///
/// The id is bound after the column values.
pub fn build_update_sql(table: &str, columns: &[&str]) -> String {
    let mut assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect();
    assignments.push(format!("updated_at = {STORE_NOW_SQL}"));

    format!(
        "UPDATE {table} SET {} WHERE id = ?{} RETURNING *;",
        assignments.join(", "),
        columns.len() + 1
    )
}

pub fn build_select_by_id_sql(table: &str) -> String {
    format!("SELECT * FROM {table} WHERE id = ?1;")
}

pub fn build_delete_by_id_sql(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = ?1;")
}

/// Binds `Option<&str>` as text or SQL `NULL`.
pub fn opt_text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

/// Generic CRUD helper over one entity table.
///
/// Holds nothing but the borrowed executor, so it is cheap to copy into
/// each entity repository.
pub struct CrudRepository<'x, E, X: ?Sized> {
    executor: &'x X,
    _entity: PhantomData<fn() -> E>,
}

impl<E, X: ?Sized> Clone for CrudRepository<'_, E, X> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, X: ?Sized> Copy for CrudRepository<'_, E, X> {}

impl<'x, E, X> CrudRepository<'x, E, X>
where
    E: Entity,
    X: QueryExecutor + ?Sized,
{
    pub fn new(executor: &'x X) -> Self {
        Self {
            executor,
            _entity: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        E::TABLE
    }

    pub fn executor(&self) -> &'x X {
        self.executor
    }

    /// Single-row lookup by primary key.
    pub fn find_by_id(&self, id: EntityId) -> RepoResult<Option<E>> {
        let sql = build_select_by_id_sql(E::TABLE);
        let mut entities = self.fetch_all(&sql, &[Value::Integer(id)])?;
        if entities.is_empty() {
            return Ok(None);
        }
        Ok(Some(entities.swap_remove(0)))
    }

    /// Inserts exactly the supplied columns and returns the stored entity.
    pub fn create(&self, fields: &impl ColumnSet) -> RepoResult<E> {
        let (names, values) = split_columns(fields.columns());
        let sql = build_insert_sql(E::TABLE, &names);
        debug!(
            "event=repo_insert module=repo table={} columns={}",
            E::TABLE,
            names.len()
        );

        self.fetch_all(&sql, &values)?
            .into_iter()
            .next()
            .ok_or(RepoError::MissingReturnedRow(E::TABLE))
    }

    /// Updates only the supplied columns.
    ///
    /// Returns `Ok(None)` when no row has `id`. With an empty column set the
    /// current row is returned and nothing is written.
    pub fn update(&self, id: EntityId, fields: &impl ColumnSet) -> RepoResult<Option<E>> {
        let (names, mut values) = split_columns(fields.columns());
        if names.is_empty() {
            return self.find_by_id(id);
        }

        let sql = build_update_sql(E::TABLE, &names);
        values.push(Value::Integer(id));
        debug!(
            "event=repo_update module=repo table={} id={id} columns={}",
            E::TABLE,
            names.len()
        );

        Ok(self.fetch_all(&sql, &values)?.into_iter().next())
    }

    /// Deletes by primary key; `false` when no row matched.
    pub fn delete(&self, id: EntityId) -> RepoResult<bool> {
        let sql = build_delete_by_id_sql(E::TABLE);
        let changed = self.executor.execute(&sql, &[Value::Integer(id)])?;
        Ok(changed > 0)
    }

    /// Runs a row-returning statement and maps every row.
    pub fn fetch_all(&self, sql: &str, params: &[Value]) -> RepoResult<Vec<E>> {
        let rows = self.executor.query(sql, params)?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in &rows {
            let typed = E::Row::from_store_row(row)?;
            entities.push(E::from_row(typed)?);
        }
        Ok(entities)
    }

    /// Runs a statement and returns the affected row count.
    pub fn execute(&self, sql: &str, params: &[Value]) -> RepoResult<usize> {
        Ok(self.executor.execute(sql, params)?)
    }
}

fn split_columns(columns: Vec<(&'static str, Value)>) -> (Vec<&'static str>, Vec<Value>) {
    columns.into_iter().unzip()
}

#[cfg(test)]
mod tests {
    use super::{
        build_delete_by_id_sql, build_insert_sql, build_select_by_id_sql, build_update_sql,
        opt_text_value,
    };
    use rusqlite::types::Value;

    #[test]
    fn insert_sql_lists_exactly_the_given_columns() {
        assert_eq!(
            build_insert_sql("antecedents", &["patient_id", "type", "content"]),
            "INSERT INTO antecedents (patient_id, type, content) VALUES (?1, ?2, ?3) RETURNING *;"
        );
        assert_eq!(
            build_insert_sql("t", &[]),
            "INSERT INTO t DEFAULT VALUES RETURNING *;"
        );
    }

    #[test]
    fn update_sql_binds_id_after_columns_and_refreshes_updated_at() {
        let sql = build_update_sql("antecedents", &["type", "content"]);
        assert!(sql.starts_with("UPDATE antecedents SET type = ?1, content = ?2, updated_at = strftime("));
        assert!(sql.ends_with("WHERE id = ?3 RETURNING *;"));
    }

    #[test]
    fn by_id_statements_use_a_single_placeholder() {
        assert_eq!(build_select_by_id_sql("users"), "SELECT * FROM users WHERE id = ?1;");
        assert_eq!(build_delete_by_id_sql("users"), "DELETE FROM users WHERE id = ?1;");
    }

    #[test]
    fn opt_text_value_maps_absence_to_null() {
        assert_eq!(opt_text_value(None), Value::Null);
        assert_eq!(opt_text_value(Some("x")), Value::Text("x".to_string()));
    }
}
