use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEV_JWT_SECRET: &str = "scholarflow-dev-secret";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expire_days: i64,
}

#[derive(Debug, Clone)]
pub struct LatexConfig {
    /// Script handed to the interpreter
    pub script_path: PathBuf,
    /// Directory swept for stray compiler byproducts
    pub artifact_dir: PathBuf,
    /// Interpreter executables, tried in order
    pub interpreters: Vec<String>,
    pub timeout: Duration,
    pub max_concurrent: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub production: bool,
    pub frontend_url: String,
    pub jwt: JwtConfig,
    pub latex: LatexConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if production => return Err("JWT_SECRET must be set in production".to_string()),
            _ => {
                log::warn!("JWT_SECRET not set; using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 5000)?,
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "scholarflow".to_string()),
            production,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt: JwtConfig {
                secret,
                expire_days: parse_var("JWT_EXPIRE_DAYS", 7)?,
            },
            latex: LatexConfig {
                script_path: env::var("LATEX_SCRIPT")
                    .unwrap_or_else(|_| "latex/app.py".to_string())
                    .into(),
                artifact_dir: env::var("LATEX_ROOT")
                    .unwrap_or_else(|_| "latex".to_string())
                    .into(),
                interpreters: interpreter_candidates(),
                timeout: Duration::from_secs(parse_var("LATEX_TIMEOUT_SECS", 120)?),
                max_concurrent: parse_var::<usize>("LATEX_MAX_CONCURRENT", 2)?.max(1),
            },
        })
    }
}

/// Explicit overrides first, then the usual interpreter names.
fn interpreter_candidates() -> Vec<String> {
    let mut candidates: Vec<String> = ["LATEX_PYTHON", "PYTHON_PATH", "PYTHON"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .filter(|v| !v.trim().is_empty())
        .collect();
    for fallback in ["python3", "python", "py"] {
        if !candidates.iter().any(|c| c == fallback) {
            candidates.push(fallback.to_string());
        }
    }
    candidates
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}
