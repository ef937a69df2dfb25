//! Medical record (dated clinical entry) domain model.

use super::row::{parse_date, parse_timestamp, Entity, FromStoreRow, RowMapError};
use super::EntityId;
use crate::db::StoreRow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Dated clinical entry owned by a patient.
///
/// `category` is free text chosen by the clinician (consultation, bilan,
/// imagerie, ...), unlike antecedent kinds which form a closed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: EntityId,
    pub patient_id: EntityId,
    pub category: String,
    pub date: NaiveDate,
    pub details: Option<String>,
    pub created_by: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalRecordRow {
    pub id: i64,
    pub patient_id: i64,
    pub category: String,
    pub date: String,
    pub details: Option<String>,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl FromStoreRow for MedicalRecordRow {
    fn from_store_row(row: &StoreRow) -> Result<Self, RowMapError> {
        Ok(Self {
            id: row.get_i64("id")?,
            patient_id: row.get_i64("patient_id")?,
            category: row.get_text("category")?,
            date: row.get_text("date")?,
            details: row.get_opt_text("details")?,
            created_by: row.get_i64("created_by")?,
            created_at: row.get_text("created_at")?,
            updated_at: row.get_text("updated_at")?,
        })
    }
}

pub fn row_to_medical_record(row: MedicalRecordRow) -> Result<MedicalRecord, RowMapError> {
    Ok(MedicalRecord {
        id: row.id,
        patient_id: row.patient_id,
        category: row.category,
        date: parse_date("date", &row.date)?,
        details: row.details,
        created_by: row.created_by,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: parse_timestamp("updated_at", &row.updated_at)?,
    })
}

impl Entity for MedicalRecord {
    const TABLE: &'static str = "medical_records";
    type Row = MedicalRecordRow;

    fn from_row(row: Self::Row) -> Result<Self, RowMapError> {
        row_to_medical_record(row)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicalRecord {
    pub patient_id: EntityId,
    pub category: String,
    pub date: NaiveDate,
    pub details: Option<String>,
    pub created_by: EntityId,
}

/// Mutable fields; `details: Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicalRecordChanges {
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub details: Option<Option<String>>,
}

impl MedicalRecordChanges {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.date.is_none() && self.details.is_none()
    }
}
