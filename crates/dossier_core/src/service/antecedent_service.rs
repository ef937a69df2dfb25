//! Antecedent use-case service.
//!
//! # Responsibility
//! - Validate antecedent commands and check the owning patient exists.
//! - Expose bulk cleanup for the patient deletion workflow.
//!
//! # Invariants
//! - `create` performs no repository call until input is valid.
//! - `update` checks the antecedent exists before validating the patch.
//! - `create` never inserts for a patient that was not found.
//! - Only `type` and `content` are mutable through `update`.
//! - `get_by_patient_and_kind` does not check the patient exists, unlike
//!   `get_by_patient_id`; an unknown patient yields an empty list.

use super::error::{require_id, require_non_blank, EntityKind, ServiceError, ServiceResult};
use super::patient_service::PatientDependents;
use crate::model::antecedent::{Antecedent, AntecedentChanges, AntecedentType, NewAntecedent};
use crate::model::EntityId;
use crate::repo::antecedent_repo::AntecedentRepository;
use crate::repo::patient_repo::PatientRepository;
use log::{debug, info, warn};

/// Command for recording a new antecedent. `created_by` comes from the
/// authenticated caller, not from the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateAntecedent {
    pub patient_id: EntityId,
    pub kind: String,
    pub content: String,
    pub created_by: EntityId,
}

/// Partial update; fields left `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntecedentPatch {
    pub kind: Option<String>,
    pub content: Option<String>,
}

/// Parses caller-supplied antecedent type text.
pub fn parse_antecedent_type(value: &str) -> ServiceResult<AntecedentType> {
    require_non_blank("type", value)?;
    AntecedentType::parse_label(value)
        .ok_or_else(|| ServiceError::validation("type", "unknown antecedent type"))
}

pub struct AntecedentService<A: AntecedentRepository, P: PatientRepository> {
    repo: A,
    patients: P,
}

impl<A: AntecedentRepository, P: PatientRepository> AntecedentService<A, P> {
    pub fn new(repo: A, patients: P) -> Self {
        Self { repo, patients }
    }

    /// Lists a patient's antecedents, most recent first.
    ///
    /// Fails with `NotFound` naming the patient when it does not exist.
    pub fn get_by_patient_id(&self, patient_id: EntityId) -> ServiceResult<Vec<Antecedent>> {
        self.ensure_patient_exists(patient_id)?;
        let antecedents = self.repo.find_by_patient(patient_id)?;
        debug!(
            "event=antecedent_list module=service status=ok patient_id={patient_id} count={}",
            antecedents.len()
        );
        Ok(antecedents)
    }

    /// Lists a patient's antecedents of one kind, most recent first.
    ///
    /// No patient existence check happens here.
    pub fn get_by_patient_and_kind(
        &self,
        patient_id: EntityId,
        kind: AntecedentType,
    ) -> ServiceResult<Vec<Antecedent>> {
        Ok(self.repo.find_by_patient_and_kind(patient_id, &kind)?)
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Antecedent> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Antecedent, id))
    }

    pub fn create(&self, command: &CreateAntecedent) -> ServiceResult<Antecedent> {
        require_id("patientId", command.patient_id)?;
        let kind = parse_antecedent_type(&command.kind)?;
        require_non_blank("content", &command.content)?;
        require_id("createdBy", command.created_by)?;

        self.ensure_patient_exists(command.patient_id)?;

        let created = self.repo.create(&NewAntecedent {
            patient_id: command.patient_id,
            kind,
            content: command.content.clone(),
            created_by: command.created_by,
        })?;
        info!(
            "event=antecedent_create module=service status=ok antecedent_id={} patient_id={} type={}",
            created.id,
            created.patient_id,
            created.kind.as_str()
        );
        Ok(created)
    }

    /// Applies a partial update and returns the refreshed antecedent.
    ///
    /// A missing antecedent is `NotFound` whatever the patch holds. An
    /// empty patch returns the current state without writing.
    pub fn update(&self, id: EntityId, patch: &AntecedentPatch) -> ServiceResult<Antecedent> {
        if self.repo.find_by_id(id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Antecedent, id));
        }

        let changes = AntecedentChanges {
            kind: patch.kind.as_deref().map(parse_antecedent_type).transpose()?,
            content: match patch.content.as_deref() {
                Some(content) => {
                    require_non_blank("content", content)?;
                    Some(content.to_string())
                }
                None => None,
            },
        };

        match self.repo.update(id, &changes)? {
            Some(updated) => {
                info!(
                    "event=antecedent_update module=service status=ok antecedent_id={id} changed_fields={}",
                    changed_field_count(&changes)
                );
                Ok(updated)
            }
            None => {
                warn!(
                    "event=antecedent_update module=service status=error error_code=vanished_during_update antecedent_id={id}"
                );
                Err(ServiceError::Conflict(format!(
                    "antecedent {id} was removed while being updated"
                )))
            }
        }
    }

    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        if !self.repo.delete(id)? {
            return Err(ServiceError::not_found(EntityKind::Antecedent, id));
        }
        info!("event=antecedent_delete module=service status=ok antecedent_id={id}");
        Ok(())
    }

    /// Removes every antecedent of a patient. Zero matches is success.
    pub fn delete_all_for_patient(&self, patient_id: EntityId) -> ServiceResult<usize> {
        let removed = self.repo.delete_by_patient(patient_id)?;
        info!(
            "event=antecedent_bulk_delete module=service status=ok patient_id={patient_id} removed={removed}"
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

impl<A: AntecedentRepository, P: PatientRepository> PatientDependents for AntecedentService<A, P> {
    fn delete_all_for_patient(&self, patient_id: EntityId) -> ServiceResult<usize> {
        AntecedentService::delete_all_for_patient(self, patient_id)
    }
}

fn changed_field_count(changes: &AntecedentChanges) -> usize {
    usize::from(changes.kind.is_some()) + usize::from(changes.content.is_some())
}
