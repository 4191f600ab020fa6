use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::json;

/// `{success: true, message, data}`
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

/// `{success: true, count, data}` for collections.
pub fn list<T: Serialize>(items: &[T]) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "count": items.len(),
        "data": items,
    }))
}

pub fn message(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": true,
        "message": message,
    }))
}
