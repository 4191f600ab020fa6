use crate::utils::error::CustomError;
use actix_web::web;

/// bcrypt work factor for stored passwords
pub const HASH_COST: u32 = 10;

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

/// Hash on the blocking pool so workers keep serving requests.
pub async fn hash_blocking(password: String, cost: u32) -> Result<String, CustomError> {
    web::block(move || hash_password(&password, cost))
        .await?
        .map_err(|e| CustomError::internal_with("Failed to hash password", e))
}

pub async fn verify_blocking(password: String, hash: String) -> Result<bool, CustomError> {
    web::block(move || verify_password(&password, &hash))
        .await?
        .map_err(|e| CustomError::internal_with("Failed to verify password", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("s3cret!", 4).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-hash").is_err());
    }

    #[actix_web::test]
    async fn blocking_helpers_roundtrip() {
        let hash = hash_blocking("hunter22".into(), 4).await.unwrap();
        assert!(verify_blocking("hunter22".into(), hash).await.unwrap());
    }
}
