//! Antecedent (medical history entry) domain model.
//!
//! # Invariants
//! - An antecedent belongs to exactly one patient for its whole lifetime.
//! - `kind` is written from the known `AntecedentType` labels; reads keep
//!   any other stored label as `AntecedentType::Other`.
//! - `patient_id`, `created_by` and the timestamps are never mutated by
//!   callers; only `kind` and `content` can change.

use super::row::{parse_timestamp, Entity, FromStoreRow, RowMapError};
use super::EntityId;
use crate::db::StoreRow;
use chrono::{DateTime, Utc};
use serde::Serialize;

stored_label_enum! {
    /// Category of a medical history entry.
    pub enum AntecedentType {
        Medical => "medical",
        Surgical => "surgical",
        Allergy => "allergy",
        InfectiousStatus => "infectious_status",
    }
}

impl AntecedentType {
    /// Parses caller input: canonical values, English labels and the
    /// French labels used by the clinic UI, case-insensitively.
    pub fn parse_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "medical" | "médical" | "médicaux" | "medicaux" => Some(Self::Medical),
            "surgical" | "chirurgical" | "chirurgicaux" => Some(Self::Surgical),
            "allergy" | "allergies" | "allergie" => Some(Self::Allergy),
            "infectious_status" | "infectiousstatus" | "statut_infectieux" => {
                Some(Self::InfectiousStatus)
            }
            _ => None,
        }
    }
}

/// Medical history entry attached to a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Antecedent {
    pub id: EntityId,
    pub patient_id: EntityId,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: AntecedentType,
    pub content: String,
    pub created_by: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage shape of the `antecedents` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntecedentRow {
    pub id: i64,
    pub patient_id: i64,
    pub kind: String,
    pub content: String,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl FromStoreRow for AntecedentRow {
    fn from_store_row(row: &StoreRow) -> Result<Self, RowMapError> {
        Ok(Self {
            id: row.get_i64("id")?,
            patient_id: row.get_i64("patient_id")?,
            kind: row.get_text("type")?,
            content: row.get_text("content")?,
            created_by: row.get_i64("created_by")?,
            created_at: row.get_text("created_at")?,
            updated_at: row.get_text("updated_at")?,
        })
    }
}

pub fn row_to_antecedent(row: AntecedentRow) -> Result<Antecedent, RowMapError> {
    Ok(Antecedent {
        id: row.id,
        patient_id: row.patient_id,
        kind: AntecedentType::from_db(&row.kind),
        content: row.content,
        created_by: row.created_by,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: parse_timestamp("updated_at", &row.updated_at)?,
    })
}

impl Entity for Antecedent {
    const TABLE: &'static str = "antecedents";
    type Row = AntecedentRow;

    fn from_row(row: Self::Row) -> Result<Self, RowMapError> {
        row_to_antecedent(row)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Creatable fields of an antecedent; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAntecedent {
    pub patient_id: EntityId,
    pub kind: AntecedentType,
    pub content: String,
    pub created_by: EntityId,
}

/// Mutable fields of an antecedent. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntecedentChanges {
    pub kind: Option<AntecedentType>,
    pub content: Option<String>,
}

impl AntecedentChanges {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.content.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{row_to_antecedent, AntecedentRow, AntecedentType};
    use crate::model::row::RowMapError;

    fn sample_row() -> AntecedentRow {
        AntecedentRow {
            id: 3,
            patient_id: 1,
            kind: "allergy".to_string(),
            content: "Penicillin".to_string(),
            created_by: 9,
            created_at: "2024-05-01T08:00:00.000Z".to_string(),
            updated_at: "2024-05-02T08:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn row_maps_to_entity() {
        let entity = row_to_antecedent(sample_row()).unwrap();
        assert_eq!(entity.id, 3);
        assert_eq!(entity.patient_id, 1);
        assert_eq!(entity.kind, AntecedentType::Allergy);
        assert_eq!(entity.created_by, 9);
        assert!(entity.updated_at > entity.created_at);
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let mut row = sample_row();
        row.updated_at = "not a date".to_string();
        assert!(matches!(
            row_to_antecedent(row),
            Err(RowMapError::MalformedDate { column: "updated_at", .. })
        ));
    }

    #[test]
    fn parse_label_accepts_english_and_french_labels() {
        assert_eq!(AntecedentType::parse_label("Allergy"), Some(AntecedentType::Allergy));
        assert_eq!(AntecedentType::parse_label(" Allergies "), Some(AntecedentType::Allergy));
        assert_eq!(AntecedentType::parse_label("Chirurgicaux"), Some(AntecedentType::Surgical));
        assert_eq!(AntecedentType::parse_label("Médicaux"), Some(AntecedentType::Medical));
        assert_eq!(
            AntecedentType::parse_label("Statut Infectieux"),
            Some(AntecedentType::InfectiousStatus)
        );
        assert_eq!(
            AntecedentType::parse_label("infectious-status"),
            Some(AntecedentType::InfectiousStatus)
        );
        assert_eq!(AntecedentType::parse_label("dental"), None);
    }

    #[test]
    fn storage_values_roundtrip_through_from_db() {
        for kind in AntecedentType::KNOWN {
            assert_eq!(&AntecedentType::from_db(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_stored_type_passes_through_verbatim() {
        let mut row = sample_row();
        row.kind = "Dentaire".to_string();
        let entity = row_to_antecedent(row).unwrap();
        assert_eq!(entity.kind, AntecedentType::Other("Dentaire".to_string()));
        assert!(!entity.kind.is_known());
        assert_eq!(entity.kind.as_str(), "Dentaire");

        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "Dentaire");
    }

    #[test]
    fn serializes_kind_as_type_with_camel_case_fields() {
        let entity = row_to_antecedent(sample_row()).unwrap();
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "allergy");
        assert_eq!(json["patientId"], 1);
        assert_eq!(json["createdBy"], 9);
        assert!(json.get("kind").is_none());
    }
}
