//! Medical record repository contract and SQLite implementation.
//!
//! # Invariants
//! - Per-patient listings are ordered by clinical `date DESC`, then
//!   `created_at DESC, id DESC`.

use super::base_repo::{opt_text_value, ColumnSet, CrudRepository, RepoResult};
use crate::db::QueryExecutor;
use crate::model::medical_record::{MedicalRecord, MedicalRecordChanges, NewMedicalRecord};
use crate::model::row::format_date;
use crate::model::EntityId;
use rusqlite::types::Value;
use rusqlite::Connection;

const BY_PATIENT_SQL: &str = "SELECT * FROM medical_records
     WHERE patient_id = ?1
     ORDER BY date DESC, created_at DESC, id DESC;";

const BY_PATIENT_AND_CATEGORY_SQL: &str = "SELECT * FROM medical_records
     WHERE patient_id = ?1
       AND category = ?2
     ORDER BY date DESC, created_at DESC, id DESC;";

const DELETE_BY_PATIENT_SQL: &str = "DELETE FROM medical_records WHERE patient_id = ?1;";

impl ColumnSet for NewMedicalRecord {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("patient_id", Value::Integer(self.patient_id)),
            ("category", Value::Text(self.category.clone())),
            ("date", Value::Text(format_date(self.date))),
            ("details", opt_text_value(self.details.as_deref())),
            ("created_by", Value::Integer(self.created_by)),
        ]
    }
}

impl ColumnSet for MedicalRecordChanges {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        let mut columns = Vec::new();
        if let Some(category) = self.category.as_ref() {
            columns.push(("category", Value::Text(category.clone())));
        }
        if let Some(date) = self.date {
            columns.push(("date", Value::Text(format_date(date))));
        }
        if let Some(details) = self.details.as_ref() {
            columns.push(("details", opt_text_value(details.as_deref())));
        }
        columns
    }
}

pub trait MedicalRecordRepository {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<MedicalRecord>>;
    fn create(&self, record: &NewMedicalRecord) -> RepoResult<MedicalRecord>;
    fn update(
        &self,
        id: EntityId,
        changes: &MedicalRecordChanges,
    ) -> RepoResult<Option<MedicalRecord>>;
    fn delete(&self, id: EntityId) -> RepoResult<bool>;
    fn find_by_patient(&self, patient_id: EntityId) -> RepoResult<Vec<MedicalRecord>>;
    fn find_by_patient_and_category(
        &self,
        patient_id: EntityId,
        category: &str,
    ) -> RepoResult<Vec<MedicalRecord>>;
    fn delete_by_patient(&self, patient_id: EntityId) -> RepoResult<usize>;
}

pub struct SqliteMedicalRecordRepository<'x, X: ?Sized = Connection> {
    crud: CrudRepository<'x, MedicalRecord, X>,
}

impl<'x, X: QueryExecutor + ?Sized> SqliteMedicalRecordRepository<'x, X> {
    pub fn new(executor: &'x X) -> Self {
        Self {
            crud: CrudRepository::new(executor),
        }
    }
}

impl<X: QueryExecutor + ?Sized> MedicalRecordRepository for SqliteMedicalRecordRepository<'_, X> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<MedicalRecord>> {
        self.crud.find_by_id(id)
    }

    fn create(&self, record: &NewMedicalRecord) -> RepoResult<MedicalRecord> {
        self.crud.create(record)
    }

    fn update(
        &self,
        id: EntityId,
        changes: &MedicalRecordChanges,
    ) -> RepoResult<Option<MedicalRecord>> {
        self.crud.update(id, changes)
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        self.crud.delete(id)
    }

    fn find_by_patient(&self, patient_id: EntityId) -> RepoResult<Vec<MedicalRecord>> {
        self.crud
            .fetch_all(BY_PATIENT_SQL, &[Value::Integer(patient_id)])
    }

    fn find_by_patient_and_category(
        &self,
        patient_id: EntityId,
        category: &str,
    ) -> RepoResult<Vec<MedicalRecord>> {
        self.crud.fetch_all(
            BY_PATIENT_AND_CATEGORY_SQL,
            &[Value::Integer(patient_id), Value::Text(category.to_string())],
        )
    }

    fn delete_by_patient(&self, patient_id: EntityId) -> RepoResult<usize> {
        self.crud
            .execute(DELETE_BY_PATIENT_SQL, &[Value::Integer(patient_id)])
    }
}
