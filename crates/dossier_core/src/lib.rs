//! Core domain logic for the clinical dossier backend.
//! This crate is the single source of truth for record-keeping invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult, QueryExecutor, StoreRow};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::antecedent::{Antecedent, AntecedentChanges, AntecedentType, NewAntecedent};
pub use model::medical_record::{MedicalRecord, MedicalRecordChanges, NewMedicalRecord};
pub use model::patient::{
    BloodGroup, EndReason, MaritalStatus, NewPatient, Patient, PatientChanges, PatientType, Sex,
};
pub use model::row::{Entity, FromStoreRow, RowMapError};
pub use model::user::{NewUser, User, UserChanges, UserRole};
pub use model::EntityId;
pub use repo::antecedent_repo::{AntecedentRepository, SqliteAntecedentRepository};
pub use repo::base_repo::{ColumnSet, CrudRepository, RepoError, RepoResult};
pub use repo::medical_record_repo::{MedicalRecordRepository, SqliteMedicalRecordRepository};
pub use repo::patient_repo::{PatientRepository, SqlitePatientRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::antecedent_service::{
    parse_antecedent_type, AntecedentPatch, AntecedentService, CreateAntecedent,
};
pub use service::error::{EntityKind, ServiceError, ServiceResult};
pub use service::medical_record_service::{CreateMedicalRecord, MedicalRecordService};
pub use service::patient_service::{PatientDeletion, PatientDependents, PatientService};
pub use service::user_service::{CreateUser, UserService};
pub use service::{
    antecedent_service, medical_record_service, patient_service, user_service,
    SqliteAntecedentService, SqliteMedicalRecordService, SqlitePatientService, SqliteUserService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
