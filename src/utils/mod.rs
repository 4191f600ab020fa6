pub mod email;
pub mod error;
pub mod hashing;
pub mod helpers;
pub mod response;
pub mod validation;
