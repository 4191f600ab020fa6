use rand::Rng;
use sha2::{Digest, Sha256};

/// OTP expiration time in minutes
pub const OTP_EXPIRATION_MINUTES: i64 = 10;

/// Password reset token lifetime in minutes
pub const RESET_TOKEN_EXPIRATION_MINUTES: i64 = 10;

/// Generate a 6-digit OTP code
pub fn generate_otp_code() -> String {
    let mut rng = rand::rng();
    let code: u32 = rng.random_range(100_000..=999_999);
    code.to_string()
}

/// Generate a password reset token. Only the token's hash is stored.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 20];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn random_hex(len_bytes: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len_bytes).map(|_| rng.random()).collect();
    hex::encode(bytes)
}
