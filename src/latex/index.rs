use super::controller::{download_ieee, download_ieee_pdf, preview_ieee};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn latex_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/latex")
            .wrap(HttpAuthentication::with_fn(verify_token))
            .route("/ieee/pdf/{paper_id}", web::get().to(download_ieee_pdf))
            .route("/ieee/{paper_id}", web::get().to(download_ieee))
            .route("/preview/ieee/{paper_id}", web::get().to(preview_ieee)),
    );
}
