use crate::latex::compiler::LatexCompiler;
use crate::middleware::auth::TokenKeys;
use crate::middleware::error_handler::{json_config, path_config};
use crate::paper::service::PaperService;
use crate::user::service::UserService;
use actix_web::web;
use std::sync::Arc;

/// Shared services, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub users: web::Data<UserService>,
    pub papers: web::Data<PaperService>,
    pub tokens: web::Data<TokenKeys>,
    pub compiler: web::Data<dyn LatexCompiler>,
}

impl AppState {
    pub fn new(
        users: UserService,
        papers: PaperService,
        tokens: TokenKeys,
        compiler: Arc<dyn LatexCompiler>,
    ) -> Self {
        AppState {
            users: web::Data::new(users),
            papers: web::Data::new(papers),
            tokens: web::Data::new(tokens),
            compiler: web::Data::from(compiler),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.users.clone())
            .app_data(self.papers.clone())
            .app_data(self.tokens.clone())
            .app_data(self.compiler.clone())
            .app_data(json_config())
            .app_data(path_config());
    }
}
