//! Medical record use-case service.
//!
//! Both per-patient listings check the patient exists.

use super::error::{require_id, require_non_blank, EntityKind, ServiceError, ServiceResult};
use super::patient_service::PatientDependents;
use crate::model::medical_record::{MedicalRecord, MedicalRecordChanges, NewMedicalRecord};
use crate::model::EntityId;
use crate::repo::medical_record_repo::MedicalRecordRepository;
use crate::repo::patient_repo::PatientRepository;
use chrono::NaiveDate;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMedicalRecord {
    pub patient_id: EntityId,
    pub category: String,
    pub date: NaiveDate,
    pub details: Option<String>,
    pub created_by: EntityId,
}

pub struct MedicalRecordService<M: MedicalRecordRepository, P: PatientRepository> {
    repo: M,
    patients: P,
}

impl<M: MedicalRecordRepository, P: PatientRepository> MedicalRecordService<M, P> {
    pub fn new(repo: M, patients: P) -> Self {
        Self { repo, patients }
    }

    pub fn get_by_patient_id(&self, patient_id: EntityId) -> ServiceResult<Vec<MedicalRecord>> {
        self.ensure_patient_exists(patient_id)?;
        Ok(self.repo.find_by_patient(patient_id)?)
    }

    pub fn get_by_patient_and_category(
        &self,
        patient_id: EntityId,
        category: &str,
    ) -> ServiceResult<Vec<MedicalRecord>> {
        require_non_blank("category", category)?;
        self.ensure_patient_exists(patient_id)?;
        Ok(self
            .repo
            .find_by_patient_and_category(patient_id, category.trim())?)
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<MedicalRecord> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::MedicalRecord, id))
    }

    pub fn create(&self, command: &CreateMedicalRecord) -> ServiceResult<MedicalRecord> {
        require_id("patientId", command.patient_id)?;
        require_non_blank("category", &command.category)?;
        require_id("createdBy", command.created_by)?;

        self.ensure_patient_exists(command.patient_id)?;

        let created = self.repo.create(&NewMedicalRecord {
            patient_id: command.patient_id,
            category: command.category.trim().to_string(),
            date: command.date,
            details: command
                .details
                .as_deref()
                .filter(|details| !details.trim().is_empty())
                .map(str::to_string),
            created_by: command.created_by,
        })?;
        info!(
            "event=medical_record_create module=service status=ok record_id={} patient_id={}",
            created.id, created.patient_id
        );
        Ok(created)
    }

    pub fn update(
        &self,
        id: EntityId,
        changes: &MedicalRecordChanges,
    ) -> ServiceResult<MedicalRecord> {
        if self.repo.find_by_id(id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::MedicalRecord, id));
        }
        if let Some(category) = changes.category.as_deref() {
            require_non_blank("category", category)?;
        }

        let mut normalized = changes.clone();
        normalized.category = changes.category.as_deref().map(|c| c.trim().to_string());

        match self.repo.update(id, &normalized)? {
            Some(updated) => {
                info!("event=medical_record_update module=service status=ok record_id={id}");
                Ok(updated)
            }
            None => {
                warn!(
                    "event=medical_record_update module=service status=error error_code=vanished_during_update record_id={id}"
                );
                Err(ServiceError::Conflict(format!(
                    "medical record {id} was removed while being updated"
                )))
            }
        }
    }

    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        if !self.repo.delete(id)? {
            return Err(ServiceError::not_found(EntityKind::MedicalRecord, id));
        }
        info!("event=medical_record_delete module=service status=ok record_id={id}");
        Ok(())
    }

    pub fn delete_all_for_patient(&self, patient_id: EntityId) -> ServiceResult<usize> {
        let removed = self.repo.delete_by_patient(patient_id)?;
        info!(
            "event=medical_record_bulk_delete module=service status=ok patient_id={patient_id} removed={removed}"
        );
        Ok(removed)
    }

    fn ensure_patient_exists(&self, patient_id: EntityId) -> ServiceResult<()> {
        if self.patients.find_by_id(patient_id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Patient, patient_id));
        }
        Ok(())
    }
}

impl<M: MedicalRecordRepository, P: PatientRepository> PatientDependents
    for MedicalRecordService<M, P>
{
    fn delete_all_for_patient(&self, patient_id: EntityId) -> ServiceResult<usize> {
        MedicalRecordService::delete_all_for_patient(self, patient_id)
    }
}
