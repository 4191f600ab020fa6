use crate::config::JwtConfig;
use crate::user::model::Session;
use crate::utils::error::CustomError;
use actix_web::cookie::{Cookie, time::Duration as CookieDuration};
use actix_web::http::StatusCode;
use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Hex ObjectId of the user
    pub id: String,
    pub exp: usize,
}

/// HS256 keys plus the token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expire_days: i64,
    secure_cookie: bool,
}

impl TokenKeys {
    pub fn new(config: &JwtConfig, secure_cookie: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            expire_days: config.expire_days,
            secure_cookie,
        }
    }

    pub fn create_token(&self, user_id: &ObjectId) -> Result<String, CustomError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::days(self.expire_days))
            .ok_or_else(|| CustomError::internal("Token expiry out of range"))?
            .timestamp() as usize;

        let claims = Claims {
            id: user_id.to_hex(),
            exp: expiration,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| CustomError::internal_with("Token generation failed", e))?;
        debug!("Issued token for user {}", claims.id);
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }

    fn cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE, token.to_owned())
            .http_only(true)
            .secure(self.secure_cookie)
            .path("/")
            .max_age(CookieDuration::days(self.expire_days))
            .finish()
    }

    /// `{success, message, token, user}` plus the HTTP-only token cookie.
    pub fn session_response(
        &self,
        status: StatusCode,
        message: &str,
        session: &Session,
    ) -> HttpResponse {
        let user = &session.user;
        HttpResponse::build(status)
            .cookie(self.cookie(&session.token))
            .json(json!({
                "success": true,
                "message": message,
                "token": session.token,
                "user": {
                    "id": user.id.map(|id| id.to_hex()),
                    "name": user.name,
                    "email": user.email,
                }
            }))
    }
}

fn unauthorized(req: ServiceRequest) -> (Error, ServiceRequest) {
    (
        CustomError::UnauthorizedError("Not authorized to access this route".into()).into(),
        req,
    )
}

/// Verify the bearer token and stash its claims in the request. Missing or
/// non-Bearer credentials are rejected with the JSON error envelope.
pub async fn verify_token(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(credentials) = credentials else {
        debug!("No bearer token on {}", req.path());
        return Err(unauthorized(req));
    };

    let keys = match req.app_data::<web::Data<TokenKeys>>() {
        Some(keys) => keys.clone(),
        None => {
            return Err((
                CustomError::internal("Token keys are not configured").into(),
                req,
            ));
        }
    };

    match keys.verify(credentials.token()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(e) => {
            warn!("Rejected bearer token: {}", e);
            Err(unauthorized(req))
        }
    }
}

/// Get user ID from request extensions (use after auth middleware)
pub fn get_user_id_from_request(req: &HttpRequest) -> Option<String> {
    req.extensions()
        .get::<Claims>()
        .map(|claims| claims.id.clone())
}

pub fn current_user_id(req: &HttpRequest) -> Result<ObjectId, CustomError> {
    let id = get_user_id_from_request(req)
        .ok_or_else(|| CustomError::UnauthorizedError("Not authenticated".to_string()))?;
    ObjectId::parse_str(&id)
        .map_err(|_| CustomError::UnauthorizedError("Invalid user id in token".to_string()))
}
