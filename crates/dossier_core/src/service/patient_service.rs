//! Patient use-case service and deletion workflow.
//!
//! # Invariants
//! - `cin` stays unique; clashes surface as `Conflict` before the store
//!   constraint fires.
//! - `care_end` is never earlier than `care_start`.
//! - Only known enum labels are written.
//! - Deleting a patient removes antecedents and medical records first; the
//!   schema does not cascade.

use super::error::{require_known, require_non_blank, EntityKind, ServiceError, ServiceResult};
use crate::model::patient::{
    BloodGroup, EndReason, MaritalStatus, NewPatient, Patient, PatientChanges, PatientType, Sex,
};
use crate::model::EntityId;
use crate::repo::patient_repo::PatientRepository;
use chrono::NaiveDate;
use log::info;

/// Owner-side cleanup hook for entities that belong to a patient.
pub trait PatientDependents {
    /// Removes every dependent row of `patient_id` and returns the count.
    fn delete_all_for_patient(&self, patient_id: EntityId) -> ServiceResult<usize>;
}

/// Outcome of the patient deletion workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientDeletion {
    pub patient_id: EntityId,
    pub antecedents_removed: usize,
    pub medical_records_removed: usize,
}

pub struct PatientService<P, A, M>
where
    P: PatientRepository,
    A: PatientDependents,
    M: PatientDependents,
{
    repo: P,
    antecedents: A,
    medical_records: M,
}

impl<P, A, M> PatientService<P, A, M>
where
    P: PatientRepository,
    A: PatientDependents,
    M: PatientDependents,
{
    pub fn new(repo: P, antecedents: A, medical_records: M) -> Self {
        Self {
            repo,
            antecedents,
            medical_records,
        }
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Patient> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Patient, id))
    }

    /// All patients ordered by name.
    pub fn list(&self) -> ServiceResult<Vec<Patient>> {
        Ok(self.repo.list_all()?)
    }

    /// Case-insensitive name search; a blank query lists everyone.
    pub fn search(&self, query: &str) -> ServiceResult<Vec<Patient>> {
        if query.trim().is_empty() {
            return self.list();
        }
        Ok(self.repo.search_by_name(query)?)
    }

    pub fn create(&self, patient: &NewPatient) -> ServiceResult<Patient> {
        require_non_blank("nom_complet", &patient.full_name)?;
        require_non_blank("cin", &patient.cin)?;
        require_non_blank("ass_cnss", &patient.cnss_number)?;
        require_known("sexe", patient.sex.is_known())?;
        require_known("groupe_sanguin", patient.blood_group.is_known())?;
        require_known(
            "situation_familiale",
            patient.marital_status.as_ref().map_or(true, MaritalStatus::is_known),
        )?;
        require_known("type_patient", patient.patient_type.is_known())?;
        require_known(
            "cause_fin",
            patient.end_reason.as_ref().map_or(true, EndReason::is_known),
        )?;
        check_care_period(patient.care_start, patient.care_end)?;

        let mut normalized = patient.clone();
        normalized.full_name = patient.full_name.trim().to_string();
        normalized.cin = normalize_cin(&patient.cin);

        if self.repo.find_by_cin(&normalized.cin)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "a patient with cin {} already exists",
                normalized.cin
            )));
        }

        let created = self.repo.create(&normalized)?;
        info!(
            "event=patient_create module=service status=ok patient_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn update(&self, id: EntityId, changes: &PatientChanges) -> ServiceResult<Patient> {
        let existing = self.get_by_id(id)?;
        if let Some(name) = changes.full_name.as_deref() {
            require_non_blank("nom_complet", name)?;
        }
        if let Some(cin) = changes.cin.as_deref() {
            require_non_blank("cin", cin)?;
        }
        if let Some(cnss) = changes.cnss_number.as_deref() {
            require_non_blank("ass_cnss", cnss)?;
        }
        require_known("sexe", changes.sex.as_ref().map_or(true, Sex::is_known))?;
        require_known(
            "groupe_sanguin",
            changes.blood_group.as_ref().map_or(true, BloodGroup::is_known),
        )?;
        require_known(
            "situation_familiale",
            changes
                .marital_status
                .as_ref()
                .and_then(Option::as_ref)
                .map_or(true, MaritalStatus::is_known),
        )?;
        require_known(
            "type_patient",
            changes.patient_type.as_ref().map_or(true, PatientType::is_known),
        )?;
        require_known(
            "cause_fin",
            changes
                .end_reason
                .as_ref()
                .and_then(Option::as_ref)
                .map_or(true, EndReason::is_known),
        )?;

        check_care_period(
            changes.care_start.unwrap_or(existing.care_start),
            changes.care_end.unwrap_or(existing.care_end),
        )?;

        let mut normalized = changes.clone();
        normalized.full_name = changes.full_name.as_deref().map(|name| name.trim().to_string());
        normalized.cin = changes.cin.as_deref().map(normalize_cin);
        if let Some(cin) = normalized.cin.as_deref() {
            if let Some(other) = self.repo.find_by_cin(cin)? {
                if other.id != id {
                    return Err(ServiceError::Conflict(format!(
                        "a patient with cin {cin} already exists"
                    )));
                }
            }
        }

        let updated = self.repo.update(id, &normalized)?.ok_or_else(|| {
            ServiceError::Conflict(format!("patient {id} was removed while being updated"))
        })?;
        info!("event=patient_update module=service status=ok patient_id={id}");
        Ok(updated)
    }

    /// Deletes a patient after removing its antecedents and medical records.
    ///
    /// Not transactional: a failure after the dependents are gone leaves the
    /// patient row in place with no dependents, and a retry completes it.
    pub fn delete(&self, id: EntityId) -> ServiceResult<PatientDeletion> {
        self.get_by_id(id)?;

        let antecedents_removed = self.antecedents.delete_all_for_patient(id)?;
        let medical_records_removed = self.medical_records.delete_all_for_patient(id)?;

        if !self.repo.delete(id)? {
            return Err(ServiceError::not_found(EntityKind::Patient, id));
        }

        info!(
            "event=patient_delete module=service status=ok patient_id={id} antecedents_removed={antecedents_removed} medical_records_removed={medical_records_removed}"
        );
        Ok(PatientDeletion {
            patient_id: id,
            antecedents_removed,
            medical_records_removed,
        })
    }
}

fn normalize_cin(cin: &str) -> String {
    cin.trim().to_uppercase()
}

fn check_care_period(start: NaiveDate, end: Option<NaiveDate>) -> ServiceResult<()> {
    match end {
        Some(end) if end < start => Err(ServiceError::validation(
            "date_fin",
            "must not be earlier than date_debut",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_care_period, normalize_cin};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn care_period_rejects_end_before_start() {
        assert!(check_care_period(day(10), Some(day(9))).is_err());
        assert!(check_care_period(day(10), Some(day(10))).is_ok());
        assert!(check_care_period(day(10), None).is_ok());
    }

    #[test]
    fn cin_is_trimmed_and_uppercased() {
        assert_eq!(normalize_cin(" ab12345 "), "AB12345");
    }
}
