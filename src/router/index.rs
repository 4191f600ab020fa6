use crate::latex::index::latex_routes;
use crate::paper::index::paper_routes;
use crate::user::index::user_routes;
use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

#[get("/")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "ScholarFlow API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
    cfg.configure(user_routes);
    cfg.configure(paper_routes);
    cfg.configure(latex_routes);
}
