use actix_cors::Cors;
use actix_web::http::header;

/// The front end may call the API with the session cookie attached.
pub fn cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url.trim_end_matches('/'))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}
