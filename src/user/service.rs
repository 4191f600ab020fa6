use crate::middleware::auth::TokenKeys;
use crate::user::model::{PendingUser, Session, User};
use crate::user::store::{PendingUserStore, UserStore};
use crate::utils::email::Mailer;
use crate::utils::error::CustomError;
use crate::utils::hashing::{self, hash_blocking, verify_blocking};
use crate::utils::helpers::{
    OTP_EXPIRATION_MINUTES, RESET_TOKEN_EXPIRATION_MINUTES, generate_otp_code,
    generate_reset_token, hash_reset_token,
};
use crate::utils::validation::{normalize_email, validate_email, validate_name, validate_password};
use chrono::{Duration, Utc};
use log::{error, info, warn};
use mongodb::bson::DateTime as BsonDateTime;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

pub struct UserService {
    users: Arc<dyn UserStore>,
    pending: Arc<dyn PendingUserStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenKeys,
    hash_cost: u32,
    frontend_url: String,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        pending: Arc<dyn PendingUserStore>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenKeys,
        frontend_url: String,
    ) -> Self {
        UserService {
            users,
            pending,
            mailer,
            tokens,
            hash_cost: hashing::HASH_COST,
            frontend_url,
        }
    }

    /// Lower bcrypt cost, for tests.
    #[cfg(test)]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn issue_session(&self, user: User) -> Result<Session, CustomError> {
        let id = user
            .id
            .ok_or_else(|| CustomError::internal("User ID missing"))?;
        let token = self.tokens.create_token(&id)?;
        Ok(Session { token, user })
    }

    async fn load_user(&self, user_id: &ObjectId) -> Result<User, CustomError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))
    }

    /// Stage a registration and email its OTP.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), CustomError> {
        let name = name.trim();
        let email = normalize_email(email);
        validate_name(name)?;
        validate_email(&email)?;
        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CustomError::BadRequestError(
                "User already exists with this email".to_string(),
            ));
        }

        let otp = generate_otp_code();
        let hashed_password = hash_blocking(password.to_string(), self.hash_cost).await?;
        let now = Utc::now();

        // a repeated registration starts over
        self.pending.delete_by_email(&email).await?;
        self.pending
            .insert(PendingUser {
                id: None,
                name: name.to_string(),
                email: email.clone(),
                password: hashed_password,
                verification_otp: otp.clone(),
                otp_expire: now + Duration::minutes(OTP_EXPIRATION_MINUTES),
                created_at: now,
            })
            .await?;

        if let Err(e) = self.mailer.send_verification_email(&email, name, &otp).await {
            error!("Error sending OTP email to {}: {}", email, e);
            if let Err(cleanup) = self.pending.delete_by_email(&email).await {
                warn!("Failed to roll back pending user {}: {}", email, cleanup);
            }
            return Err(CustomError::internal_with(
                "Failed to send verification email. Please try again.",
                e,
            ));
        }

        info!("Registration pending verification for {}", email);
        Ok(())
    }

    /// Promote a pending registration into a real account.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<Session, CustomError> {
        let email = normalize_email(email);
        let pending = self.pending.find_by_email(&email).await?.ok_or_else(|| {
            CustomError::NotFoundError(
                "No pending registration found. Please register again.".to_string(),
            )
        })?;

        if pending.is_expired(Utc::now()) {
            self.pending.delete_by_email(&email).await?;
            return Err(CustomError::BadRequestError(
                "OTP has expired. Please register again.".to_string(),
            ));
        }

        if pending.verification_otp != otp.trim() {
            return Err(CustomError::BadRequestError(
                "Invalid OTP. Please try again.".to_string(),
            ));
        }

        let user = self
            .users
            .insert(User {
                id: None,
                name: pending.name,
                email: pending.email,
                // already hashed
                password: pending.password,
                is_verified: true,
                reset_password_token: None,
                reset_password_expire: None,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                crate::database::StoreError::Duplicate => CustomError::BadRequestError(
                    "User already exists with this email".to_string(),
                ),
                other => other.into(),
            })?;

        self.pending.delete_by_email(&email).await?;
        info!("Verified new account {}", email);
        self.issue_session(user)
    }

    /// Replace the pending code and expiry and send it again.
    pub async fn resend_otp(&self, email: &str) -> Result<(), CustomError> {
        let email = normalize_email(email);
        let mut pending = self.pending.find_by_email(&email).await?.ok_or_else(|| {
            CustomError::NotFoundError(
                "No pending registration found. Please register again.".to_string(),
            )
        })?;

        pending.verification_otp = generate_otp_code();
        pending.otp_expire = Utc::now() + Duration::minutes(OTP_EXPIRATION_MINUTES);
        self.pending.update_otp(&pending).await?;

        self.mailer
            .send_verification_email(&email, &pending.name, &pending.verification_otp)
            .await
            .map_err(|e| {
                error!("Error resending OTP to {}: {}", email, e);
                CustomError::internal_with(
                    "Failed to send verification email. Please try again.",
                    e,
                )
            })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, CustomError> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            CustomError::UnauthorizedError("User not registered. Please sign up first.".to_string())
        })?;

        if !verify_blocking(password.to_string(), user.password.clone()).await? {
            return Err(CustomError::UnauthorizedError(
                "Invalid password. Please try again.".to_string(),
            ));
        }

        self.issue_session(user)
    }

    pub async fn get_me(&self, user_id: &ObjectId) -> Result<User, CustomError> {
        self.load_user(user_id).await
    }

    pub async fn update_details(
        &self,
        user_id: &ObjectId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, CustomError> {
        let mut user = self.load_user(user_id).await?;

        if let Some(name) = name {
            validate_name(name)?;
            user.name = name.trim().to_string();
        }
        if let Some(email) = email {
            let email = normalize_email(email);
            validate_email(&email)?;
            if email != user.email {
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(CustomError::ConflictError("Email already in use".to_string()));
                }
                user.email = email;
            }
        }

        self.users.replace(&user).await?;
        Ok(user)
    }

    pub async fn update_password(
        &self,
        user_id: &ObjectId,
        current_password: &str,
        new_password: &str,
    ) -> Result<Session, CustomError> {
        let mut user = self.load_user(user_id).await?;

        if !verify_blocking(current_password.to_string(), user.password.clone()).await? {
            return Err(CustomError::UnauthorizedError(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(new_password)?;

        user.password = hash_blocking(new_password.to_string(), self.hash_cost).await?;
        self.users.replace(&user).await?;
        self.issue_session(user)
    }

    /// Email a single-use reset link; only the token's hash is kept.
    pub async fn forgot_password(&self, email: &str) -> Result<(), CustomError> {
        let email = normalize_email(email);
        let mut user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            CustomError::NotFoundError("No account found with this email address".to_string())
        })?;

        let token = generate_reset_token();
        user.reset_password_token = Some(hash_reset_token(&token));
        user.reset_password_expire = Some(BsonDateTime::from_chrono(
            Utc::now() + Duration::minutes(RESET_TOKEN_EXPIRATION_MINUTES),
        ));
        self.users.replace(&user).await?;

        let reset_url = format!(
            "{}/reset-password/{}",
            self.frontend_url.trim_end_matches('/'),
            token
        );

        if let Err(e) = self
            .mailer
            .send_password_reset_email(&email, &user.name, &token, &reset_url)
            .await
        {
            error!("Error sending reset email to {}: {}", email, e);
            user.reset_password_token = None;
            user.reset_password_expire = None;
            if let Err(cleanup) = self.users.replace(&user).await {
                warn!("Failed to clear reset token for {}: {}", email, cleanup);
            }
            return Err(CustomError::internal_with(
                "Email could not be sent. Please try again.",
                e,
            ));
        }

        Ok(())
    }

    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<Session, CustomError> {
        let invalid = || CustomError::BadRequestError("Invalid or expired token".to_string());

        let mut user = self
            .users
            .find_by_reset_token(&hash_reset_token(reset_token))
            .await?
            .ok_or_else(invalid)?;

        if !user.reset_token_valid_at(Utc::now()) {
            return Err(invalid());
        }
        validate_password(password)?;

        user.password = hash_blocking(password.to_string(), self.hash_cost).await?;
        user.reset_password_token = None;
        user.reset_password_expire = None;
        self.users.replace(&user).await?;

        info!("Password reset for {}", user.email);
        self.issue_session(user)
    }

    /// Requires the current password.
    pub async fn delete_account(
        &self,
        user_id: &ObjectId,
        password: &str,
    ) -> Result<(), CustomError> {
        let user = self.load_user(user_id).await?;

        if password.is_empty() {
            return Err(CustomError::BadRequestError(
                "Please provide your password to confirm account deletion".to_string(),
            ));
        }
        if !verify_blocking(password.to_string(), user.password.clone()).await? {
            return Err(CustomError::UnauthorizedError(
                "Incorrect password. Account deletion cancelled.".to_string(),
            ));
        }

        self.users.delete(user_id).await?;
        info!("Deleted account {}", user.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::database::memory::{MemoryPendingUserStore, MemoryUserStore};
    use crate::utils::email::RecordingMailer;

    struct Harness {
        service: UserService,
        users: Arc<MemoryUserStore>,
        pending: Arc<MemoryPendingUserStore>,
        mailer: Arc<RecordingMailer>,
    }

    fn harness() -> Harness {
        let users = Arc::new(MemoryUserStore::default());
        let pending = Arc::new(MemoryPendingUserStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let tokens = TokenKeys::new(
            &JwtConfig {
                secret: "test".into(),
                expire_days: 7,
            },
            false,
        );
        let service = UserService::new(
            users.clone(),
            pending.clone(),
            mailer.clone(),
            tokens,
            "http://localhost:3000".into(),
        )
        .with_hash_cost(4);
        Harness {
            service,
            users,
            pending,
            mailer,
        }
    }

    async fn registered(h: &Harness, email: &str) -> Session {
        h.service.register("Ada", email, "secret1").await.unwrap();
        let otp = h.mailer.last_otp_for(email).unwrap();
        h.service.verify_otp(email, &otp).await.unwrap()
    }

    #[actix_web::test]
    async fn register_stages_pending_and_sends_code() {
        let h = harness();
        h.service
            .register("Ada", " Ada@Example.com ", "secret1")
            .await
            .unwrap();
        assert_eq!(h.pending.count(), 1);
        assert_eq!(h.users.count(), 0);
        let otp = h.mailer.last_otp_for("ada@example.com").unwrap();
        assert_eq!(otp.len(), 6);
    }

    #[actix_web::test]
    async fn register_rejects_bad_input() {
        let h = harness();
        assert!(h.service.register("", "a@b.com", "secret1").await.is_err());
        assert!(h.service.register("Ada", "nope", "secret1").await.is_err());
        assert!(h.service.register("Ada", "a@b.com", "123").await.is_err());
        assert_eq!(h.pending.count(), 0);
    }

    #[actix_web::test]
    async fn verify_promotes_exactly_once() {
        let h = harness();
        h.service.register("Ada", "ada@example.com", "secret1").await.unwrap();
        let otp = h.mailer.last_otp_for("ada@example.com").unwrap();

        let session = h.service.verify_otp("ada@example.com", &otp).await.unwrap();
        assert!(session.user.is_verified);
        assert!(!session.token.is_empty());
        assert_eq!(h.users.count(), 1);
        assert_eq!(h.pending.count(), 0);

        let replay = h.service.verify_otp("ada@example.com", &otp).await;
        match replay {
            Err(CustomError::NotFoundError(msg)) => {
                assert!(msg.contains("No pending registration"))
            }
            other => panic!("expected not found, got {:?}", other.map(|s| s.token)),
        }
        assert_eq!(h.users.count(), 1);
    }

    #[actix_web::test]
    async fn duplicate_registration_of_verified_account_fails() {
        let h = harness();
        registered(&h, "ada@example.com").await;
        let err = h
            .service
            .register("Ada", "ada@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::BadRequestError(_)));
        assert_eq!(h.pending.count(), 0);
    }

    #[actix_web::test]
    async fn expired_otp_deletes_pending_record() {
        let h = harness();
        h.pending
            .insert(PendingUser {
                id: None,
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "hash".into(),
                verification_otp: "123456".into(),
                otp_expire: Utc::now() - Duration::seconds(1),
                created_at: Utc::now() - Duration::minutes(9),
            })
            .await
            .unwrap();

        let err = h
            .service
            .verify_otp("ada@example.com", "123456")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expired"));
        assert_eq!(h.pending.count(), 0);
        assert_eq!(h.users.count(), 0);
    }

    #[actix_web::test]
    async fn wrong_code_keeps_pending_record() {
        let h = harness();
        h.service.register("Ada", "ada@example.com", "secret1").await.unwrap();
        let otp = h.mailer.last_otp_for("ada@example.com").unwrap();
        let wrong = if otp == "111111" { "222222" } else { "111111" };
        assert!(h.service.verify_otp("ada@example.com", wrong).await.is_err());
        assert_eq!(h.pending.count(), 1);
    }

    #[actix_web::test]
    async fn resend_replaces_previous_code() {
        let h = harness();
        h.service.register("Ada", "ada@example.com", "secret1").await.unwrap();
        let first = h.mailer.last_otp_for("ada@example.com").unwrap();

        let mut second = first.clone();
        // a fresh code can collide with the old one; retry until it differs
        while second == first {
            h.service.resend_otp("ada@example.com").await.unwrap();
            second = h.mailer.last_otp_for("ada@example.com").unwrap();
        }

        assert!(h.service.verify_otp("ada@example.com", &first).await.is_err());
        assert!(h.service.verify_otp("ada@example.com", &second).await.is_ok());
    }

    #[actix_web::test]
    async fn resend_without_pending_is_not_found() {
        let h = harness();
        let err = h.service.resend_otp("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, CustomError::NotFoundError(_)));
    }

    #[actix_web::test]
    async fn failed_email_rolls_back_registration() {
        let h = harness();
        h.mailer.set_failing(true);
        let err = h
            .service
            .register("Ada", "ada@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::InternalServerError { .. }));
        assert_eq!(h.pending.count(), 0);
    }

    #[actix_web::test]
    async fn login_distinguishes_unknown_and_wrong_password() {
        let h = harness();
        registered(&h, "ada@example.com").await;

        let unknown = h.service.login("bob@example.com", "secret1").await.unwrap_err();
        assert!(unknown.to_string().contains("not registered"));

        let wrong = h.service.login("ada@example.com", "nope123").await.unwrap_err();
        assert!(wrong.to_string().contains("Invalid password"));

        assert!(h.service.login("ADA@example.com", "secret1").await.is_ok());
    }

    #[actix_web::test]
    async fn password_reset_flow() {
        let h = harness();
        registered(&h, "ada@example.com").await;

        h.service.forgot_password("ada@example.com").await.unwrap();
        let token = h.mailer.last_reset_token_for("ada@example.com").unwrap();

        assert!(h.service.reset_password("bogus", "newpass1").await.is_err());
        h.service.reset_password(&token, "newpass1").await.unwrap();

        assert!(h.service.login("ada@example.com", "secret1").await.is_err());
        assert!(h.service.login("ada@example.com", "newpass1").await.is_ok());
        // single use
        assert!(h.service.reset_password(&token, "another1").await.is_err());
    }

    #[actix_web::test]
    async fn forgot_password_unknown_email() {
        let h = harness();
        let err = h.service.forgot_password("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, CustomError::NotFoundError(_)));
    }

    #[actix_web::test]
    async fn update_password_requires_current() {
        let h = harness();
        let session = registered(&h, "ada@example.com").await;
        let id = session.user.id.unwrap();

        let err = h
            .service
            .update_password(&id, "wrong11", "newpass1")
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::UnauthorizedError(_)));

        h.service.update_password(&id, "secret1", "newpass1").await.unwrap();
        assert!(h.service.login("ada@example.com", "newpass1").await.is_ok());
    }

    #[actix_web::test]
    async fn update_details_rejects_taken_email() {
        let h = harness();
        let ada = registered(&h, "ada@example.com").await;
        registered(&h, "bob@example.com").await;
        let id = ada.user.id.unwrap();

        let err = h
            .service
            .update_details(&id, None, Some("bob@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::ConflictError(_)));

        let user = h
            .service
            .update_details(&id, Some("Ada L."), Some("Ada.L@Example.com"))
            .await
            .unwrap();
        assert_eq!(user.name, "Ada L.");
        assert_eq!(user.email, "ada.l@example.com");
    }

    #[actix_web::test]
    async fn delete_account_requires_password() {
        let h = harness();
        let session = registered(&h, "ada@example.com").await;
        let id = session.user.id.unwrap();

        assert!(matches!(
            h.service.delete_account(&id, "").await.unwrap_err(),
            CustomError::BadRequestError(_)
        ));
        assert!(matches!(
            h.service.delete_account(&id, "wrong11").await.unwrap_err(),
            CustomError::UnauthorizedError(_)
        ));
        h.service.delete_account(&id, "secret1").await.unwrap();
        assert_eq!(h.users.count(), 0);
        assert!(matches!(
            h.service.get_me(&id).await.unwrap_err(),
            CustomError::NotFoundError(_)
        ));
    }
}
