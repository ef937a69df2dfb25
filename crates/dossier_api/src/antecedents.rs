//! Antecedent request handlers.
//!
//! # Responsibility
//! - Parse query/path/body text into service commands.
//! - Inject the authenticated caller as `createdBy`.
//! - Map service outcomes onto status codes and the response envelope.
//!
//! # Invariants
//! - Handlers never panic; malformed input is a `400`.
//! - `createdBy` in a request body is ignored.

use crate::response::ApiResponse;
use dossier_core::{
    antecedent_service, parse_antecedent_type, AntecedentPatch, CreateAntecedent, EntityId,
};
use log::{debug, warn};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;

/// Authenticated user issuing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: EntityId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAntecedentBody {
    /// Number or decimal text; resolved by `body_id`.
    patient_id: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateAntecedentBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    content: Option<String>,
}

/// `GET /antecedents?patientId=<id>&type=<kind>`
pub fn list_antecedents(
    conn: &Connection,
    patient_id: Option<&str>,
    kind: Option<&str>,
) -> ApiResponse {
    let Some(raw_patient_id) = patient_id.filter(|value| !value.trim().is_empty()) else {
        return ApiResponse::bad_request("query parameter `patientId` is required");
    };
    let Some(patient_id) = parse_id(raw_patient_id) else {
        return ApiResponse::bad_request("query parameter `patientId` must be a positive integer");
    };

    let service = antecedent_service(conn);
    let result = match kind.filter(|value| !value.trim().is_empty()) {
        Some(kind) => parse_antecedent_type(kind)
            .and_then(|kind| service.get_by_patient_and_kind(patient_id, kind)),
        None => service.get_by_patient_id(patient_id),
    };

    match result {
        Ok(antecedents) => {
            debug!(
                "event=api_request module=api status=ok operation=list_antecedents patient_id={patient_id} count={}",
                antecedents.len()
            );
            ApiResponse::ok(&antecedents, None)
        }
        Err(err) => ApiResponse::from_service_error("list_antecedents", &err),
    }
}

/// `GET /antecedents/:id`
pub fn get_antecedent(conn: &Connection, id: &str) -> ApiResponse {
    let Some(id) = parse_id(id) else {
        return invalid_path_id();
    };
    match antecedent_service(conn).get_by_id(id) {
        Ok(antecedent) => ApiResponse::ok(&antecedent, None),
        Err(err) => ApiResponse::from_service_error("get_antecedent", &err),
    }
}

/// `POST /antecedents` with `{patientId, type, content}`.
pub fn create_antecedent(conn: &Connection, caller: Caller, body: &str) -> ApiResponse {
    let body: CreateAntecedentBody = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let patient_id = match body.patient_id.as_ref().map(body_id) {
        Some(Some(id)) => id,
        Some(None) => {
            return ApiResponse::bad_request("body field `patientId` must be a positive integer")
        }
        None => 0,
    };
    let command = CreateAntecedent {
        patient_id,
        kind: body.kind.unwrap_or_default(),
        content: body.content.unwrap_or_default(),
        created_by: caller.user_id,
    };

    match antecedent_service(conn).create(&command) {
        Ok(antecedent) => ApiResponse::created(&antecedent, "antecedent created"),
        Err(err) => ApiResponse::from_service_error("create_antecedent", &err),
    }
}

/// `PUT /antecedents/:id` with a partial `{type?, content?}` body.
pub fn update_antecedent(conn: &Connection, id: &str, body: &str) -> ApiResponse {
    let Some(id) = parse_id(id) else {
        return invalid_path_id();
    };
    let body: UpdateAntecedentBody = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let patch = AntecedentPatch {
        kind: body.kind,
        content: body.content,
    };

    match antecedent_service(conn).update(id, &patch) {
        Ok(antecedent) => ApiResponse::ok(&antecedent, Some("antecedent updated")),
        Err(err) => ApiResponse::from_service_error("update_antecedent", &err),
    }
}

/// `DELETE /antecedents/:id`
pub fn delete_antecedent(conn: &Connection, id: &str) -> ApiResponse {
    let Some(id) = parse_id(id) else {
        return invalid_path_id();
    };
    match antecedent_service(conn).delete(id) {
        Ok(()) => ApiResponse::no_content(),
        Err(err) => ApiResponse::from_service_error("delete_antecedent", &err),
    }
}

fn parse_id(raw: &str) -> Option<EntityId> {
    raw.trim().parse::<EntityId>().ok().filter(|id| *id > 0)
}

/// Accepts `5` and `"5"`; anything else is not an id.
fn body_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(number) => number.as_i64().filter(|id| *id > 0),
        Value::String(raw) => parse_id(raw),
        _ => None,
    }
}

fn invalid_path_id() -> ApiResponse {
    ApiResponse::bad_request("path parameter `id` must be a positive integer")
}

fn parse_body<T: for<'de> Deserialize<'de> + Default>(body: &str) -> Result<T, ApiResponse> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|err| {
        warn!(
            "event=api_request module=api status=error error_code=invalid_body line={} column={}",
            err.line(),
            err.column()
        );
        ApiResponse::bad_request(format!("request body is not valid for this operation: {err}"))
    })
}
