use super::controller::{
    create_paper, delete_paper, get_paper, get_papers, get_papers_by_status, update_paper,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn paper_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/papers")
            .wrap(HttpAuthentication::with_fn(verify_token))
            .route("", web::get().to(get_papers))
            .route("", web::post().to(create_paper))
            .route("/status/{status}", web::get().to(get_papers_by_status))
            .route("/{id}", web::get().to(get_paper))
            .route("/{id}", web::put().to(update_paper))
            .route("/{id}", web::delete().to(delete_paper)),
    );
}
