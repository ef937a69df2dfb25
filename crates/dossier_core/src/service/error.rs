//! Service error taxonomy shared by every use-case service.

use crate::model::EntityId;
use crate::repo::base_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Entity kind named in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Patient,
    Antecedent,
    MedicalRecord,
    User,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Antecedent => "antecedent",
            Self::MedicalRecord => "medical record",
            Self::User => "user",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum ServiceError {
    /// Caller input is missing, blank or malformed. Recoverable by the
    /// caller resubmitting corrected input.
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    /// Referenced entity does not exist.
    NotFound { entity: EntityKind, id: EntityId },
    /// Uniqueness clash, or the target vanished between check and write.
    Conflict(String),
    /// Repository/store failure, propagated unmodified.
    Store(RepoError),
}

impl ServiceError {
    pub(crate) fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    pub(crate) fn not_found(entity: EntityKind, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            Self::NotFound { entity, id } => write!(f, "{entity} with id {id} not found"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Rejects empty and whitespace-only values.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(field, "must not be blank"));
    }
    Ok(())
}

/// Rejects enum values read back from foreign rows (`Other`) on the
/// write path; only known labels are stored through the services.
pub(crate) fn require_known(field: &'static str, known: bool) -> ServiceResult<()> {
    if !known {
        return Err(ServiceError::validation(field, "unrecognised value"));
    }
    Ok(())
}

/// Rejects ids the store can never have assigned.
pub(crate) fn require_id(field: &'static str, id: EntityId) -> ServiceResult<()> {
    if id <= 0 {
        return Err(ServiceError::validation(field, "is required"));
    }
    Ok(())
}
