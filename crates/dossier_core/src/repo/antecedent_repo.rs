//! Antecedent repository contract and SQLite implementation.
//!
//! # Invariants
//! - Per-patient listings are ordered most recent first
//!   (`created_at DESC`, ties broken by `id DESC`).
//! - `delete_by_patient` is idempotent and reports the removed row count.

use super::base_repo::{ColumnSet, CrudRepository, RepoResult};
use crate::db::QueryExecutor;
use crate::model::antecedent::{Antecedent, AntecedentChanges, AntecedentType, NewAntecedent};
use crate::model::EntityId;
use rusqlite::types::Value;
use rusqlite::Connection;

const BY_PATIENT_SQL: &str = "SELECT * FROM antecedents
     WHERE patient_id = ?1
     ORDER BY created_at DESC, id DESC;";

const BY_PATIENT_AND_TYPE_SQL: &str = "SELECT * FROM antecedents
     WHERE patient_id = ?1
       AND type = ?2
     ORDER BY created_at DESC, id DESC;";

const DELETE_BY_PATIENT_SQL: &str = "DELETE FROM antecedents WHERE patient_id = ?1;";

impl ColumnSet for NewAntecedent {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("patient_id", Value::Integer(self.patient_id)),
            ("type", Value::Text(self.kind.as_str().to_string())),
            ("content", Value::Text(self.content.clone())),
            ("created_by", Value::Integer(self.created_by)),
        ]
    }
}

impl ColumnSet for AntecedentChanges {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        let mut columns = Vec::new();
        if let Some(kind) = self.kind.as_ref() {
            columns.push(("type", Value::Text(kind.as_str().to_string())));
        }
        if let Some(content) = self.content.as_ref() {
            columns.push(("content", Value::Text(content.clone())));
        }
        columns
    }
}

/// Repository interface for antecedent persistence.
pub trait AntecedentRepository {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Antecedent>>;
    fn create(&self, antecedent: &NewAntecedent) -> RepoResult<Antecedent>;
    /// Returns `Ok(None)` when the antecedent does not exist.
    fn update(&self, id: EntityId, changes: &AntecedentChanges) -> RepoResult<Option<Antecedent>>;
    fn delete(&self, id: EntityId) -> RepoResult<bool>;
    fn find_by_patient(&self, patient_id: EntityId) -> RepoResult<Vec<Antecedent>>;
    fn find_by_patient_and_kind(
        &self,
        patient_id: EntityId,
        kind: &AntecedentType,
    ) -> RepoResult<Vec<Antecedent>>;
    fn delete_by_patient(&self, patient_id: EntityId) -> RepoResult<usize>;
}

/// SQLite-backed antecedent repository.
pub struct SqliteAntecedentRepository<'x, X: ?Sized = Connection> {
    crud: CrudRepository<'x, Antecedent, X>,
}

impl<'x, X: QueryExecutor + ?Sized> SqliteAntecedentRepository<'x, X> {
    pub fn new(executor: &'x X) -> Self {
        Self {
            crud: CrudRepository::new(executor),
        }
    }
}

impl<X: QueryExecutor + ?Sized> AntecedentRepository for SqliteAntecedentRepository<'_, X> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Antecedent>> {
        self.crud.find_by_id(id)
    }

    fn create(&self, antecedent: &NewAntecedent) -> RepoResult<Antecedent> {
        self.crud.create(antecedent)
    }

    fn update(&self, id: EntityId, changes: &AntecedentChanges) -> RepoResult<Option<Antecedent>> {
        self.crud.update(id, changes)
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        self.crud.delete(id)
    }

    fn find_by_patient(&self, patient_id: EntityId) -> RepoResult<Vec<Antecedent>> {
        self.crud
            .fetch_all(BY_PATIENT_SQL, &[Value::Integer(patient_id)])
    }

    fn find_by_patient_and_kind(
        &self,
        patient_id: EntityId,
        kind: &AntecedentType,
    ) -> RepoResult<Vec<Antecedent>> {
        self.crud.fetch_all(
            BY_PATIENT_AND_TYPE_SQL,
            &[
                Value::Integer(patient_id),
                Value::Text(kind.as_str().to_string()),
            ],
        )
    }

    fn delete_by_patient(&self, patient_id: EntityId) -> RepoResult<usize> {
        self.crud
            .execute(DELETE_BY_PATIENT_SQL, &[Value::Integer(patient_id)])
    }
}
