#![allow(dead_code)]

use chrono::NaiveDate;
use dossier_core::{
    BloodGroup, NewPatient, NewUser, Patient, PatientRepository, PatientType, Sex,
    SqlitePatientRepository, SqliteUserRepository, User, UserRepository, UserRole,
};
use dossier_core::db::{DbResult, QueryExecutor, StoreRow};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::cell::RefCell;

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn new_patient(name: &str, cin: &str) -> NewPatient {
    NewPatient {
        full_name: name.to_string(),
        cin: cin.to_string(),
        cnss_number: format!("CNSS-{cin}"),
        birth_date: day(1985, 4, 12),
        sex: Sex::Female,
        blood_group: BloodGroup::OPositive,
        profession: None,
        marital_status: None,
        phone: Some("0611223344".to_string()),
        emergency_phone: None,
        address: None,
        care_start: day(2024, 1, 8),
        patient_type: PatientType::Permanent,
        care_end: None,
        end_reason: None,
    }
}

pub fn seed_patient(conn: &Connection, name: &str, cin: &str) -> Patient {
    SqlitePatientRepository::new(conn)
        .create(&new_patient(name, cin))
        .unwrap()
}

pub fn seed_user(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::new(conn)
        .create(&NewUser {
            username: username.to_string(),
            password: "$argon2id$placeholder".to_string(),
            role: UserRole::Medecin,
            assigned_patients: Vec::new(),
        })
        .unwrap()
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

/// Executor that records every statement before delegating to SQLite.
pub struct RecordingExecutor<'c> {
    inner: &'c Connection,
    statements: RefCell<Vec<String>>,
}

impl<'c> RecordingExecutor<'c> {
    pub fn new(inner: &'c Connection) -> Self {
        Self {
            inner,
            statements: RefCell::new(Vec::new()),
        }
    }

    pub fn statement_count(&self) -> usize {
        self.statements.borrow().len()
    }

    pub fn last_statement(&self) -> String {
        self.statements.borrow().last().cloned().unwrap_or_default()
    }
}

impl QueryExecutor for RecordingExecutor<'_> {
    fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<StoreRow>> {
        self.statements.borrow_mut().push(sql.to_string());
        QueryExecutor::query(self.inner, sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        self.statements.borrow_mut().push(sql.to_string());
        QueryExecutor::execute(self.inner, sql, params)
    }
}
