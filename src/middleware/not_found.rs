use crate::utils::error::CustomError;

/// Fallback for unmatched routes.
pub async fn not_found() -> Result<actix_web::HttpResponse, CustomError> {
    Err(CustomError::NotFoundError("Route does not exist".into()))
}
