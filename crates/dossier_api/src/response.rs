//! Response envelope and service-error mapping.
//!
//! # Invariants
//! - Every body is `{success, data?, message?}`; `204` carries no body.
//! - Store failures are logged server-side and reported without details.

use dossier_core::ServiceError;
use log::error;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub(crate) fn ok(data: &impl Serialize, message: Option<&str>) -> Self {
        Self::success(STATUS_OK, data, message)
    }

    pub(crate) fn created(data: &impl Serialize, message: &str) -> Self {
        Self::success(STATUS_CREATED, data, Some(message))
    }

    pub(crate) fn no_content() -> Self {
        Self {
            status: STATUS_NO_CONTENT,
            body: None,
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::failure(STATUS_BAD_REQUEST, message.into())
    }

    pub(crate) fn from_service_error(operation: &'static str, err: &ServiceError) -> Self {
        match err {
            ServiceError::Validation { .. } => Self::failure(STATUS_BAD_REQUEST, err.to_string()),
            ServiceError::NotFound { .. } => Self::failure(STATUS_NOT_FOUND, err.to_string()),
            ServiceError::Conflict(_) => Self::failure(STATUS_CONFLICT, err.to_string()),
            ServiceError::Store(store) => {
                error!(
                    "event=api_request module=api status=error operation={operation} error_code=store_failure error={store}"
                );
                Self::failure(STATUS_INTERNAL_ERROR, "internal server error".to_string())
            }
        }
    }

    /// Whether the envelope reports success (`true` for `204` as well).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Envelope `data` member, if any.
    pub fn data(&self) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get("data"))
    }

    /// Envelope `message` member, if any.
    pub fn message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
    }

    fn success(status: u16, data: &impl Serialize, message: Option<&str>) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(err) => {
                error!(
                    "event=api_request module=api status=error error_code=serialize_failed error={err}"
                );
                return Self::failure(STATUS_INTERNAL_ERROR, "internal server error".to_string());
            }
        };

        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        body.insert("data".to_string(), data);
        if let Some(message) = message {
            body.insert("message".to_string(), Value::String(message.to_string()));
        }
        Self {
            status,
            body: Some(Value::Object(body)),
        }
    }

    fn failure(status: u16, message: String) -> Self {
        Self {
            status,
            body: Some(json!({ "success": false, "message": message })),
        }
    }
}
