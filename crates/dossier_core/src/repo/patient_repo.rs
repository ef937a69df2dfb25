//! Patient repository contract and SQLite implementation.
//!
//! # Invariants
//! - `list_all` and `search_by_name` are ordered by `nom_complet ASC, id ASC`.
//! - Name search escapes `LIKE` wildcards in caller input.

use super::base_repo::{opt_text_value, ColumnSet, CrudRepository, RepoResult};
use crate::db::QueryExecutor;
use crate::model::patient::{NewPatient, Patient, PatientChanges};
use crate::model::row::format_date;
use crate::model::EntityId;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Connection;

const BY_CIN_SQL: &str = "SELECT * FROM patients WHERE cin = ?1;";
const LIST_ALL_SQL: &str = "SELECT * FROM patients ORDER BY nom_complet ASC, id ASC;";
const SEARCH_BY_NAME_SQL: &str = "SELECT * FROM patients
     WHERE nom_complet LIKE ?1 ESCAPE '\\'
     ORDER BY nom_complet ASC, id ASC;";

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn date(value: NaiveDate) -> Value {
    Value::Text(format_date(value))
}

impl ColumnSet for NewPatient {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("nom_complet", text(&self.full_name)),
            ("cin", text(&self.cin)),
            ("ass_cnss", text(&self.cnss_number)),
            ("date_naissance", date(self.birth_date)),
            ("sexe", text(self.sex.as_str())),
            ("groupe_sanguin", text(self.blood_group.as_str())),
            ("profession", opt_text_value(self.profession.as_deref())),
            (
                "situation_familiale",
                opt_text_value(self.marital_status.as_ref().map(|status| status.as_str())),
            ),
            ("telephone", opt_text_value(self.phone.as_deref())),
            ("telephone_urgence", opt_text_value(self.emergency_phone.as_deref())),
            ("adresse", opt_text_value(self.address.as_deref())),
            ("date_debut", date(self.care_start)),
            ("type_patient", text(self.patient_type.as_str())),
            ("date_fin", self.care_end.map_or(Value::Null, date)),
            (
                "cause_fin",
                opt_text_value(self.end_reason.as_ref().map(|reason| reason.as_str())),
            ),
        ]
    }
}

impl ColumnSet for PatientChanges {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        let mut columns = Vec::new();
        if let Some(value) = self.full_name.as_deref() {
            columns.push(("nom_complet", text(value)));
        }
        if let Some(value) = self.cin.as_deref() {
            columns.push(("cin", text(value)));
        }
        if let Some(value) = self.cnss_number.as_deref() {
            columns.push(("ass_cnss", text(value)));
        }
        if let Some(value) = self.birth_date {
            columns.push(("date_naissance", date(value)));
        }
        if let Some(value) = self.sex.as_ref() {
            columns.push(("sexe", text(value.as_str())));
        }
        if let Some(value) = self.blood_group.as_ref() {
            columns.push(("groupe_sanguin", text(value.as_str())));
        }
        if let Some(value) = self.profession.as_ref() {
            columns.push(("profession", opt_text_value(value.as_deref())));
        }
        if let Some(value) = self.marital_status.as_ref() {
            columns.push((
                "situation_familiale",
                opt_text_value(value.as_ref().map(|status| status.as_str())),
            ));
        }
        if let Some(value) = self.phone.as_ref() {
            columns.push(("telephone", opt_text_value(value.as_deref())));
        }
        if let Some(value) = self.emergency_phone.as_ref() {
            columns.push(("telephone_urgence", opt_text_value(value.as_deref())));
        }
        if let Some(value) = self.address.as_ref() {
            columns.push(("adresse", opt_text_value(value.as_deref())));
        }
        if let Some(value) = self.care_start {
            columns.push(("date_debut", date(value)));
        }
        if let Some(value) = self.patient_type.as_ref() {
            columns.push(("type_patient", text(value.as_str())));
        }
        if let Some(value) = self.care_end {
            columns.push(("date_fin", value.map_or(Value::Null, date)));
        }
        if let Some(value) = self.end_reason.as_ref() {
            columns.push((
                "cause_fin",
                opt_text_value(value.as_ref().map(|reason| reason.as_str())),
            ));
        }
        columns
    }
}

/// Repository interface for patient persistence.
pub trait PatientRepository {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Patient>>;
    fn create(&self, patient: &NewPatient) -> RepoResult<Patient>;
    fn update(&self, id: EntityId, changes: &PatientChanges) -> RepoResult<Option<Patient>>;
    fn delete(&self, id: EntityId) -> RepoResult<bool>;
    fn find_by_cin(&self, cin: &str) -> RepoResult<Option<Patient>>;
    fn list_all(&self) -> RepoResult<Vec<Patient>>;
    fn search_by_name(&self, fragment: &str) -> RepoResult<Vec<Patient>>;
}

/// SQLite-backed patient repository.
pub struct SqlitePatientRepository<'x, X: ?Sized = Connection> {
    crud: CrudRepository<'x, Patient, X>,
}

impl<'x, X: QueryExecutor + ?Sized> SqlitePatientRepository<'x, X> {
    pub fn new(executor: &'x X) -> Self {
        Self {
            crud: CrudRepository::new(executor),
        }
    }
}

impl<X: QueryExecutor + ?Sized> PatientRepository for SqlitePatientRepository<'_, X> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Patient>> {
        self.crud.find_by_id(id)
    }

    fn create(&self, patient: &NewPatient) -> RepoResult<Patient> {
        self.crud.create(patient)
    }

    fn update(&self, id: EntityId, changes: &PatientChanges) -> RepoResult<Option<Patient>> {
        self.crud.update(id, changes)
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        self.crud.delete(id)
    }

    fn find_by_cin(&self, cin: &str) -> RepoResult<Option<Patient>> {
        Ok(self.crud.fetch_all(BY_CIN_SQL, &[text(cin)])?.into_iter().next())
    }

    fn list_all(&self) -> RepoResult<Vec<Patient>> {
        self.crud.fetch_all(LIST_ALL_SQL, &[])
    }

    fn search_by_name(&self, fragment: &str) -> RepoResult<Vec<Patient>> {
        let pattern = format!("%{}%", escape_like(fragment.trim()));
        self.crud.fetch_all(SEARCH_BY_NAME_SQL, &[Value::Text(pattern)])
    }
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE` pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
