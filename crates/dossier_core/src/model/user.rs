//! User account domain model.
//!
//! # Invariants
//! - `username` is unique.
//! - `password` holds an opaque credential produced by the auth layer and
//!   is never serialized.
//! - `assigned_patients` is stored as a JSON array of patient ids.

use super::row::{parse_timestamp, Entity, FromStoreRow, RowMapError};
use super::EntityId;
use crate::db::StoreRow;
use chrono::{DateTime, Utc};
use serde::Serialize;

stored_label_enum! {
    pub enum UserRole {
        Admin => "admin",
        Medecin => "medecin",
        Infirmier => "infirmier",
    }
}

impl UserRole {
    /// Parses caller input case-insensitively, tolerating accents.
    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "medecin" | "médecin" | "doctor" => Some(Self::Medecin),
            "infirmier" | "infirmière" | "infirmiere" | "nurse" => Some(Self::Infirmier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub assigned_patients: Vec<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_assigned_to(&self, patient_id: EntityId) -> bool {
        self.assigned_patients.contains(&patient_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub assigned_patients: String,
    pub created_at: String,
    pub updated_at: String,
}

impl FromStoreRow for UserRow {
    fn from_store_row(row: &StoreRow) -> Result<Self, RowMapError> {
        Ok(Self {
            id: row.get_i64("id")?,
            username: row.get_text("username")?,
            password: row.get_text("password")?,
            role: row.get_text("role")?,
            assigned_patients: row.get_text("assigned_patients")?,
            created_at: row.get_text("created_at")?,
            updated_at: row.get_text("updated_at")?,
        })
    }
}

pub fn row_to_user(row: UserRow) -> Result<User, RowMapError> {
    let assigned_patients = decode_patient_ids(&row.assigned_patients)?;
    Ok(User {
        id: row.id,
        username: row.username,
        password: row.password,
        role: UserRole::from_db(&row.role),
        assigned_patients,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: parse_timestamp("updated_at", &row.updated_at)?,
    })
}

/// Encodes patient ids as the JSON array text stored in `assigned_patients`.
pub fn encode_patient_ids(ids: &[EntityId]) -> String {
    serde_json::Value::from(ids.to_vec()).to_string()
}

fn decode_patient_ids(value: &str) -> Result<Vec<EntityId>, RowMapError> {
    serde_json::from_str(value).map_err(|err| RowMapError::MalformedJson {
        column: "assigned_patients",
        message: err.to_string(),
    })
}

impl Entity for User {
    const TABLE: &'static str = "users";
    type Row = UserRow;

    fn from_row(row: Self::Row) -> Result<Self, RowMapError> {
        row_to_user(row)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub assigned_patients: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub assigned_patients: Option<Vec<EntityId>>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.assigned_patients.is_none()
    }
}
