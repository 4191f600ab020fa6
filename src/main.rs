use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use env_logger::Env;
use log::{error, info};
use std::sync::Arc;

mod config;
mod database;
mod latex;
mod middleware;
mod paper;
mod router;
mod state;
mod user;
mod utils;

use config::AppConfig;
use database::connect_to_mongo;
use latex::compiler::ScriptCompiler;
use middleware::auth::TokenKeys;
use middleware::cors::cors;
use middleware::not_found::not_found;
use paper::service::PaperService;
use paper::store::MongoPaperStore;
use router::index::routes;
use state::AppState;
use user::service::UserService;
use user::store::{MongoPendingUserStore, MongoUserStore};
use utils::email::{EmailConfig, EmailService};
use utils::error::set_production_mode;

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("Unrecovered panic: {}", panic_info);
        default_hook(panic_info);
        std::process::exit(1);
    }));
}

fn startup_error(message: impl std::fmt::Display) -> std::io::Error {
    error!("{}", message);
    std::io::Error::other(message.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    install_panic_hook();

    let config = AppConfig::from_env().map_err(startup_error)?;
    set_production_mode(config.production);

    let database = connect_to_mongo(&config.mongodb_uri, &config.database_name)
        .await
        .map_err(|e| startup_error(format!("Failed to connect to MongoDB: {e}")))?;

    let mailer = EmailService::new(EmailConfig::from_env().map_err(startup_error)?)
        .map_err(startup_error)?;

    let tokens = TokenKeys::new(&config.jwt, config.production);
    let user_service = UserService::new(
        Arc::new(MongoUserStore::new(&database.db)),
        Arc::new(MongoPendingUserStore::new(&database.db)),
        Arc::new(mailer),
        tokens.clone(),
        config.frontend_url.clone(),
    );
    let paper_service = PaperService::new(Arc::new(MongoPaperStore::new(&database.db)));
    let compiler = Arc::new(ScriptCompiler::new(config.latex.clone()));

    let state = AppState::new(user_service, paper_service, tokens, compiler);

    info!(
        "Starting ScholarFlow on http://{}:{} ({} mode)",
        config.host,
        config.port,
        if config.production { "production" } else { "development" }
    );

    let frontend_url = config.frontend_url.clone();
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(cors(&frontend_url))
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
            .configure(routes)
            .default_service(web::to(not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
