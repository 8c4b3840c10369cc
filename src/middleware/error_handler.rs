use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    Error, HttpRequest,
};
use tracing::warn;

use crate::core::AppError;

/// Render malformed JSON bodies as `validation` errors in the standard shape
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    warn!(path = req.path(), error = %err, "Rejected request body");
    AppError::validation(format!("Malformed JSON payload: {}", err)).into()
}

/// Render unparseable path segments (e.g. a non-numeric negotiation id)
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> Error {
    warn!(path = req.path(), error = %err, "Rejected path parameters");
    AppError::validation(format!("Invalid path parameter: {}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    warn!(path = req.path(), error = %err, "Rejected query string");
    AppError::validation(format!("Invalid query string: {}", err)).into()
}
