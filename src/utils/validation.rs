use crate::utils::error::CustomError;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([\.-]?\w+)*@\w+([\.-]?\w+)*(\.\w{2,3})+$").expect("email pattern compiles")
});

pub const MAX_NAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;
// bcrypt only looks at the first 72 bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate an already-normalized email address.
pub fn validate_email(email: &str) -> Result<(), CustomError> {
    if email.is_empty() {
        return Err(CustomError::ValidationError("Please provide an email".into()));
    }
    if !is_valid_email(email) {
        return Err(CustomError::ValidationError("Please provide a valid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), CustomError> {
    if name.trim().is_empty() {
        return Err(CustomError::ValidationError("Please provide a name".into()));
    }
    if name.trim().chars().count() > MAX_NAME_LEN {
        return Err(CustomError::ValidationError(format!(
            "Name cannot be more than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CustomError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CustomError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(CustomError::ValidationError(format!(
            "Password cannot be longer than {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Treat `None`, empty and whitespace-only strings alike.
pub fn require<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, CustomError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CustomError::BadRequestError(message.to_string())),
    }
}

/// Like [`require`] but keeps the value untouched; for passwords.
pub fn require_secret<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, CustomError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CustomError::BadRequestError(message.to_string())),
    }
}
