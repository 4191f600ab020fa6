use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use std::sync::OnceLock;
use thiserror::Error;

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Hide raw error detail from 500 responses. Called once at startup.
pub fn set_production_mode(production: bool) {
    let _ = PRODUCTION.set(production);
}

fn is_production() -> bool {
    PRODUCTION.get().copied().unwrap_or(false)
}

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("{0}")]
    UnauthorizedError(String),

    #[error("{0}")]
    ForbiddenError(String),

    #[error("{0}")]
    BadRequestError(String),

    #[error("{0}")]
    ConflictError(String),

    #[error("{0}")]
    NotFoundError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{message}")]
    InternalServerError {
        message: String,
        detail: Option<String>,
    },
}

impl CustomError {
    pub fn internal(message: impl Into<String>) -> Self {
        CustomError::InternalServerError {
            message: message.into(),
            detail: None,
        }
    }

    pub fn internal_with(message: impl Into<String>, detail: impl ToString) -> Self {
        CustomError::InternalServerError {
            message: message.into(),
            detail: Some(detail.to_string()),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::ForbiddenError(..) => "FORBIDDEN_ERROR",
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
            CustomError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.code(),
        });

        if let CustomError::InternalServerError {
            detail: Some(detail),
            ..
        } = self
        {
            if !is_production() {
                body["detail"] = json!(detail);
            }
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<actix_web::error::BlockingError> for CustomError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        CustomError::internal_with("Background task failed", err)
    }
}
