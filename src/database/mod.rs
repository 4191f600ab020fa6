pub mod db;
#[cfg(test)]
pub mod memory;

pub use db::connect_to_mongo;

use crate::utils::error::CustomError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key")]
    Duplicate,

    #[error("{0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
            if write_error.code == DUPLICATE_KEY {
                return StoreError::Duplicate;
            }
        }
        StoreError::Backend(err.to_string())
    }
}

impl From<StoreError> for CustomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => CustomError::ConflictError("Email already in use".into()),
            StoreError::Backend(detail) => CustomError::internal_with("Database error", detail),
        }
    }
}
