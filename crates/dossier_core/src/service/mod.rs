//! Use-case services above the repository layer.
//!
//! # Responsibility
//! - Validate caller input before any repository call.
//! - Enforce cross-entity existence checks the store does not.
//! - Drive the patient deletion workflow (dependents first, then patient).
//!
//! # Invariants
//! - Services never swallow repository errors.
//! - Parent-existence check followed by a child insert is not atomic; a
//!   concurrent patient delete in between surfaces as a store error.

use crate::repo::antecedent_repo::SqliteAntecedentRepository;
use crate::repo::medical_record_repo::SqliteMedicalRecordRepository;
use crate::repo::patient_repo::SqlitePatientRepository;
use crate::repo::user_repo::SqliteUserRepository;
use rusqlite::Connection;

pub mod antecedent_service;
pub mod error;
pub mod medical_record_service;
pub mod patient_service;
pub mod user_service;

use antecedent_service::AntecedentService;
use medical_record_service::MedicalRecordService;
use patient_service::PatientService;
use user_service::UserService;

pub type SqliteAntecedentService<'c> =
    AntecedentService<SqliteAntecedentRepository<'c>, SqlitePatientRepository<'c>>;
pub type SqliteMedicalRecordService<'c> =
    MedicalRecordService<SqliteMedicalRecordRepository<'c>, SqlitePatientRepository<'c>>;
pub type SqlitePatientService<'c> = PatientService<
    SqlitePatientRepository<'c>,
    SqliteAntecedentService<'c>,
    SqliteMedicalRecordService<'c>,
>;
pub type SqliteUserService<'c> = UserService<SqliteUserRepository<'c>, SqlitePatientRepository<'c>>;

pub fn antecedent_service(conn: &Connection) -> SqliteAntecedentService<'_> {
    AntecedentService::new(
        SqliteAntecedentRepository::new(conn),
        SqlitePatientRepository::new(conn),
    )
}

pub fn medical_record_service(conn: &Connection) -> SqliteMedicalRecordService<'_> {
    MedicalRecordService::new(
        SqliteMedicalRecordRepository::new(conn),
        SqlitePatientRepository::new(conn),
    )
}

pub fn patient_service(conn: &Connection) -> SqlitePatientService<'_> {
    PatientService::new(
        SqlitePatientRepository::new(conn),
        antecedent_service(conn),
        medical_record_service(conn),
    )
}

pub fn user_service(conn: &Connection) -> SqliteUserService<'_> {
    UserService::new(SqliteUserRepository::new(conn), SqlitePatientRepository::new(conn))
}
