use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// A verified account. `password` holds the bcrypt hash and never leaves the
/// service layer; responses go through [`UserResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_expire: Option<BsonDateTime>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// True while a reset token is stored and unexpired at `now`.
    pub fn reset_token_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.reset_password_token.is_some()
            && self
                .reset_password_expire
                .is_some_and(|expire| expire.to_chrono() > now)
    }
}

/// Registration staged until the emailed OTP is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub verification_otp: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub otp_expire: DateTime<Utc>,
    // TTL index key
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl PendingUser {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.otp_expire
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Result of a successful login/verification: the signed token plus who it is for.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteAccountRequest {
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn response_never_carries_password() {
        let user = User {
            id: Some(ObjectId::new()),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "$2b$10$hash".into(),
            is_verified: true,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["isVerified"], true);
    }

    #[test]
    fn reset_expiry_is_stored_as_bson_date() {
        let now = Utc::now();
        let user = User {
            id: None,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "hash".into(),
            is_verified: true,
            reset_password_token: Some("abc".into()),
            reset_password_expire: Some(BsonDateTime::from_chrono(now + Duration::minutes(10))),
            created_at: now,
        };
        let doc = mongodb::bson::to_document(&user).unwrap();
        assert!(matches!(
            doc.get("resetPasswordExpire"),
            Some(mongodb::bson::Bson::DateTime(_))
        ));
        assert!(user.reset_token_valid_at(now));
        assert!(!user.reset_token_valid_at(now + Duration::minutes(11)));
    }

    #[test]
    fn pending_expiry_is_strict() {
        let now = Utc::now();
        let pending = PendingUser {
            id: None,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "hash".into(),
            verification_otp: "123456".into(),
            otp_expire: now,
            created_at: now - Duration::minutes(10),
        };
        assert!(!pending.is_expired(now));
        assert!(pending.is_expired(now + Duration::seconds(1)));
    }
}
