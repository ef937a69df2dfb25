//! Patient domain model.
//!
//! # Invariants
//! - `cin` (national identity card number) is unique across patients.
//! - `care_end`, when set, is not earlier than `care_start`.
//! - A patient owns its antecedents and medical records; the store does not
//!   cascade, so dependents are deleted explicitly before the patient.

use super::row::{parse_date, parse_opt_date, parse_timestamp, Entity, FromStoreRow, RowMapError};
use super::EntityId;
use crate::db::StoreRow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

stored_label_enum! {
    pub enum Sex {
        Male => "Masculin",
        Female => "Féminin",
    }
}

stored_label_enum! {
    pub enum BloodGroup {
        APositive => "A+",
        ANegative => "A-",
        BPositive => "B+",
        BNegative => "B-",
        AbPositive => "AB+",
        AbNegative => "AB-",
        OPositive => "O+",
        ONegative => "O-",
    }
}

stored_label_enum! {
    pub enum MaritalStatus {
        Single => "Célibataire",
        Married => "Marié(e)",
        Divorced => "Divorcé(e)",
        Widowed => "Veuf/Veuve",
    }
}

stored_label_enum! {
    /// Whether the patient is followed long-term or for a bounded episode.
    pub enum PatientType {
        Permanent => "Permanent",
        Temporary => "Temporaire",
    }
}

stored_label_enum! {
    /// Reason a patient's follow-up ended.
    pub enum EndReason {
        Recovery => "Guérison",
        Death => "Décès",
        Transfer => "Transfert",
        Dropout => "Abandon",
    }
}

/// Root clinical entity.
///
/// Serialized with the column naming the clinic front-end already consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patient {
    pub id: EntityId,
    #[serde(rename = "nom_complet")]
    pub full_name: String,
    pub cin: String,
    #[serde(rename = "ass_cnss")]
    pub cnss_number: String,
    #[serde(rename = "date_naissance")]
    pub birth_date: NaiveDate,
    #[serde(rename = "sexe")]
    pub sex: Sex,
    #[serde(rename = "groupe_sanguin")]
    pub blood_group: BloodGroup,
    pub profession: Option<String>,
    #[serde(rename = "situation_familiale")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    #[serde(rename = "telephone_urgence")]
    pub emergency_phone: Option<String>,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    #[serde(rename = "date_debut")]
    pub care_start: NaiveDate,
    #[serde(rename = "type_patient")]
    pub patient_type: PatientType,
    #[serde(rename = "date_fin")]
    pub care_end: Option<NaiveDate>,
    #[serde(rename = "cause_fin")]
    pub end_reason: Option<EndReason>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Storage shape of the `patients` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRow {
    pub id: i64,
    pub nom_complet: String,
    pub cin: String,
    pub ass_cnss: String,
    pub date_naissance: String,
    pub sexe: String,
    pub groupe_sanguin: String,
    pub profession: Option<String>,
    pub situation_familiale: Option<String>,
    pub telephone: Option<String>,
    pub telephone_urgence: Option<String>,
    pub adresse: Option<String>,
    pub date_debut: String,
    pub type_patient: String,
    pub date_fin: Option<String>,
    pub cause_fin: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl FromStoreRow for PatientRow {
    fn from_store_row(row: &StoreRow) -> Result<Self, RowMapError> {
        Ok(Self {
            id: row.get_i64("id")?,
            nom_complet: row.get_text("nom_complet")?,
            cin: row.get_text("cin")?,
            ass_cnss: row.get_text("ass_cnss")?,
            date_naissance: row.get_text("date_naissance")?,
            sexe: row.get_text("sexe")?,
            groupe_sanguin: row.get_text("groupe_sanguin")?,
            profession: row.get_opt_text("profession")?,
            situation_familiale: row.get_opt_text("situation_familiale")?,
            telephone: row.get_opt_text("telephone")?,
            telephone_urgence: row.get_opt_text("telephone_urgence")?,
            adresse: row.get_opt_text("adresse")?,
            date_debut: row.get_text("date_debut")?,
            type_patient: row.get_text("type_patient")?,
            date_fin: row.get_opt_text("date_fin")?,
            cause_fin: row.get_opt_text("cause_fin")?,
            created_at: row.get_text("created_at")?,
            updated_at: row.get_text("updated_at")?,
        })
    }
}

pub fn row_to_patient(row: PatientRow) -> Result<Patient, RowMapError> {
    Ok(Patient {
        id: row.id,
        full_name: row.nom_complet,
        cin: row.cin,
        cnss_number: row.ass_cnss,
        birth_date: parse_date("date_naissance", &row.date_naissance)?,
        sex: Sex::from_db(&row.sexe),
        blood_group: BloodGroup::from_db(&row.groupe_sanguin),
        profession: row.profession,
        marital_status: row.situation_familiale.as_deref().map(MaritalStatus::from_db),
        phone: row.telephone,
        emergency_phone: row.telephone_urgence,
        address: row.adresse,
        care_start: parse_date("date_debut", &row.date_debut)?,
        patient_type: PatientType::from_db(&row.type_patient),
        care_end: parse_opt_date("date_fin", row.date_fin.as_deref())?,
        end_reason: row.cause_fin.as_deref().map(EndReason::from_db),
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: parse_timestamp("updated_at", &row.updated_at)?,
    })
}

impl Entity for Patient {
    const TABLE: &'static str = "patients";
    type Row = PatientRow;

    fn from_row(row: Self::Row) -> Result<Self, RowMapError> {
        row_to_patient(row)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Creatable fields of a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub full_name: String,
    pub cin: String,
    pub cnss_number: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub blood_group: BloodGroup,
    pub profession: Option<String>,
    pub marital_status: Option<MaritalStatus>,
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub address: Option<String>,
    pub care_start: NaiveDate,
    pub patient_type: PatientType,
    pub care_end: Option<NaiveDate>,
    pub end_reason: Option<EndReason>,
}

/// Mutable fields of a patient.
///
/// Outer `None` leaves a column untouched; for nullable columns
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientChanges {
    pub full_name: Option<String>,
    pub cin: Option<String>,
    pub cnss_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub blood_group: Option<BloodGroup>,
    pub profession: Option<Option<String>>,
    pub marital_status: Option<Option<MaritalStatus>>,
    pub phone: Option<Option<String>>,
    pub emergency_phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub care_start: Option<NaiveDate>,
    pub patient_type: Option<PatientType>,
    pub care_end: Option<Option<NaiveDate>>,
    pub end_reason: Option<Option<EndReason>>,
}
