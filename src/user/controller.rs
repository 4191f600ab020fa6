use crate::middleware::auth::{TokenKeys, current_user_id};
use crate::user::model::{
    CreateUserRequest, DeleteAccountRequest, EmailRequest, LoginRequest, ResetPasswordRequest,
    UpdateDetailsRequest, UpdatePasswordRequest, UserResponse, VerifyOtpRequest,
};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::response;
use crate::utils::validation::{require, require_secret};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

/// POST /api/auth/register
pub async fn register_user(
    user_service: web::Data<UserService>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, CustomError> {
    let missing = "Please provide all required fields";
    let name = require(&body.name, missing)?;
    let email = require(&body.email, missing)?;
    let password = require_secret(&body.password, missing)?;

    user_service.register(name, email, password).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "OTP sent to your email. Please verify to complete registration.",
        "requiresVerification": true
    })))
}

/// POST /api/auth/verify-otp
pub async fn verify_otp(
    user_service: web::Data<UserService>,
    tokens: web::Data<TokenKeys>,
    body: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, CustomError> {
    let missing = "Please provide email and OTP";
    let email = require(&body.email, missing)?;
    let otp = require(&body.otp, missing)?;

    let session = user_service.verify_otp(email, otp).await?;
    Ok(tokens.session_response(
        StatusCode::CREATED,
        "Email verified! Registration successful.",
        &session,
    ))
}

/// POST /api/auth/resend-otp
pub async fn resend_otp(
    user_service: web::Data<UserService>,
    body: web::Json<EmailRequest>,
) -> Result<HttpResponse, CustomError> {
    let email = require(&body.email, "Please provide email address")?;
    user_service.resend_otp(email).await?;
    Ok(response::message(StatusCode::OK, "New OTP sent to your email"))
}

/// POST /api/auth/login
pub async fn login_user(
    user_service: web::Data<UserService>,
    tokens: web::Data<TokenKeys>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, CustomError> {
    let missing = "Please provide email and password";
    let email = require(&body.email, missing)?;
    let password = require_secret(&body.password, missing)?;

    let session = user_service.login(email, password).await?;
    Ok(tokens.session_response(StatusCode::OK, "Login successful", &session))
}

/// POST /api/auth/forgotpassword
pub async fn forgot_password(
    user_service: web::Data<UserService>,
    body: web::Json<EmailRequest>,
) -> Result<HttpResponse, CustomError> {
    let email = require(&body.email, "Please provide an email address")?;
    user_service.forgot_password(email).await?;
    Ok(response::message(
        StatusCode::OK,
        "Password reset instructions have been sent to your email",
    ))
}

/// PUT /api/auth/resetpassword/{token}
pub async fn reset_password(
    user_service: web::Data<UserService>,
    tokens: web::Data<TokenKeys>,
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, CustomError> {
    let password = body.password.as_deref().unwrap_or_default();
    let session = user_service
        .reset_password(&path.into_inner(), password)
        .await?;
    Ok(tokens.session_response(StatusCode::OK, "Password reset successful", &session))
}

/// GET /api/auth/me
pub async fn get_me(
    req: HttpRequest,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    let user_id = current_user_id(&req)?;
    let user = user_service.get_me(&user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": UserResponse::from(&user)
    })))
}

/// PUT /api/auth/updatedetails
pub async fn update_details(
    req: HttpRequest,
    user_service: web::Data<UserService>,
    body: web::Json<UpdateDetailsRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = current_user_id(&req)?;
    let user = user_service
        .update_details(&user_id, body.name.as_deref(), body.email.as_deref())
        .await?;
    Ok(response::success(
        StatusCode::OK,
        "User details updated successfully",
        UserResponse::from(&user),
    ))
}

/// PUT /api/auth/updatepassword
pub async fn update_password(
    req: HttpRequest,
    user_service: web::Data<UserService>,
    tokens: web::Data<TokenKeys>,
    body: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = current_user_id(&req)?;
    let missing = "Please provide current and new password";
    let current = require_secret(&body.current_password, missing)?;
    let new_password = require_secret(&body.new_password, missing)?;

    let session = user_service
        .update_password(&user_id, current, new_password)
        .await?;
    Ok(tokens.session_response(StatusCode::OK, "Password updated successfully", &session))
}

/// DELETE /api/auth/deleteaccount
pub async fn delete_account(
    req: HttpRequest,
    user_service: web::Data<UserService>,
    body: web::Json<DeleteAccountRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = current_user_id(&req)?;
    let password = body.password.as_deref().unwrap_or_default();
    user_service.delete_account(&user_id, password).await?;
    Ok(response::message(StatusCode::OK, "Account deleted successfully"))
}
