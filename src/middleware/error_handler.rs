use crate::utils::error::CustomError;
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{Error, HttpRequest, web};
use log::debug;

/// Malformed JSON bodies answer with the usual error envelope.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("Rejected JSON body on {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_string()
        }
        other => format!("Invalid request body: {other}"),
    };
    CustomError::BadRequestError(message).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> Error {
    CustomError::BadRequestError(format!("Invalid path parameter: {err}")).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(json_error_handler)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}
