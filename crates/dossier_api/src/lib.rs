//! Framework-free request handlers for the clinic front-end.
//!
//! An HTTP adapter extracts path, query and body text, resolves the
//! authenticated caller, and forwards to these functions; it only has to copy
//! `ApiResponse::status` and `ApiResponse::body` onto the wire.

pub mod antecedents;
mod response;

pub use antecedents::{
    create_antecedent, delete_antecedent, get_antecedent, list_antecedents, update_antecedent,
    Caller,
};
pub use response::ApiResponse;
