//! Repository layer: generic CRUD plus per-entity specializations.
//!
//! # Responsibility
//! - Build parameterized statements and run them through a `QueryExecutor`.
//! - Map returned rows into domain entities.
//!
//! # Invariants
//! - Caller-supplied values are always bound, never formatted into SQL.
//! - Executor failures propagate unchanged; nothing is retried here.
//! - Absence is `Ok(None)` / `Ok(false)`, never an error.

pub mod antecedent_repo;
pub mod base_repo;
pub mod medical_record_repo;
pub mod patient_repo;
pub mod user_repo;
