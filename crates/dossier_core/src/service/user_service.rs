//! User account use-case service.
//!
//! # Invariants
//! - Usernames match `^[A-Za-z0-9._-]{3,50}$` and are unique.
//! - Assigned patient ids reference existing patients at write time.
//! - The stored credential is opaque here; hashing belongs to the auth layer.

use super::error::{require_known, require_non_blank, EntityKind, ServiceError, ServiceResult};
use crate::model::user::{NewUser, User, UserChanges, UserRole};
use crate::model::EntityId;
use crate::repo::patient_repo::PatientRepository;
use crate::repo::user_repo::UserRepository;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{3,50}$").expect("valid username regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub assigned_patients: Vec<EntityId>,
}

pub struct UserService<U: UserRepository, P: PatientRepository> {
    repo: U,
    patients: P,
}

impl<U: UserRepository, P: PatientRepository> UserService<U, P> {
    pub fn new(repo: U, patients: P) -> Self {
        Self { repo, patients }
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<User> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::User, id))
    }

    pub fn get_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(self.repo.find_by_username(username.trim())?)
    }

    pub fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_all()?)
    }

    pub fn list_assigned_to(&self, patient_id: EntityId) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_assigned_to(patient_id)?)
    }

    pub fn create(&self, command: &CreateUser) -> ServiceResult<User> {
        let username = validate_username(&command.username)?;
        require_non_blank("password", &command.password)?;
        require_known("role", command.role.is_known())?;
        let assigned_patients = dedup_ids(&command.assigned_patients);
        for patient_id in &assigned_patients {
            self.ensure_patient_exists(*patient_id)?;
        }

        if self.repo.find_by_username(&username)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "username {username} is already taken"
            )));
        }

        let created = self.repo.create(&NewUser {
            username,
            password: command.password.clone(),
            role: command.role.clone(),
            assigned_patients,
        })?;
        info!(
            "event=user_create module=service status=ok user_id={} role={}",
            created.id,
            created.role.as_str()
        );
        Ok(created)
    }

    pub fn update(&self, id: EntityId, changes: &UserChanges) -> ServiceResult<User> {
        self.get_by_id(id)?;
        let mut normalized = changes.clone();
        if let Some(username) = changes.username.as_deref() {
            normalized.username = Some(validate_username(username)?);
        }
        if let Some(password) = changes.password.as_deref() {
            require_non_blank("password", password)?;
        }
        if let Some(role) = changes.role.as_ref() {
            require_known("role", role.is_known())?;
        }
        if let Some(ids) = changes.assigned_patients.as_deref() {
            let ids = dedup_ids(ids);
            for patient_id in &ids {
                self.ensure_patient_exists(*patient_id)?;
            }
            normalized.assigned_patients = Some(ids);
        }

        if let Some(username) = normalized.username.as_deref() {
            if let Some(other) = self.repo.find_by_username(username)? {
                if other.id != id {
                    return Err(ServiceError::Conflict(format!(
                        "username {username} is already taken"
                    )));
                }
            }
        }

        let updated = self.repo.update(id, &normalized)?.ok_or_else(|| {
            ServiceError::Conflict(format!("user {id} was removed while being updated"))
        })?;
        info!("event=user_update module=service status=ok user_id={id}");
        Ok(updated)
    }

    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        if !self.repo.delete(id)? {
            return Err(ServiceError::not_found(EntityKind::User, id));
        }
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }

    /// Adds a patient to the user's assignment list; already assigned is a
    /// no-op that returns the current user.
    pub fn assign_patient(&self, user_id: EntityId, patient_id: EntityId) -> ServiceResult<User> {
        let user = self.get_by_id(user_id)?;
        self.ensure_patient_exists(patient_id)?;
        if user.is_assigned_to(patient_id) {
            return Ok(user);
        }

        let mut assigned = user.assigned_patients;
        assigned.push(patient_id);
        self.write_assignments(user_id, assigned)
    }

    /// Removes a patient from the user's assignment list if present.
    pub fn unassign_patient(&self, user_id: EntityId, patient_id: EntityId) -> ServiceResult<User> {
        let user = self.get_by_id(user_id)?;
        if !user.is_assigned_to(patient_id) {
            return Ok(user);
        }

        let assigned = user
            .assigned_patients
            .into_iter()
            .filter(|id| *id != patient_id)
            .collect();
        self.write_assignments(user_id, assigned)
    }

    fn write_assignments(&self, user_id: EntityId, assigned: Vec<EntityId>) -> ServiceResult<User> {
        let changes = UserChanges {
            assigned_patients: Some(assigned),
            ..UserChanges::default()
        };
        self.repo.update(user_id, &changes)?.ok_or_else(|| {
            ServiceError::Conflict(format!("user {user_id} was removed while being updated"))
        })
    }

    fn ensure_patient_exists(&self, patient_id: EntityId) -> ServiceResult<()> {
        if self.patients.find_by_id(patient_id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Patient, patient_id));
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> ServiceResult<String> {
    let trimmed = username.trim();
    require_non_blank("username", trimmed)?;
    if !USERNAME_RE.is_match(trimmed) {
        return Err(ServiceError::validation(
            "username",
            "must be 3-50 characters of letters, digits, '.', '_' or '-'",
        ));
    }
    Ok(trimmed.to_string())
}

fn dedup_ids(ids: &[EntityId]) -> Vec<EntityId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}
