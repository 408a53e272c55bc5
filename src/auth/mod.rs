//! Token issuance/verification and the session cookie it travels in.

pub mod cookie;
pub mod tokens;

pub use tokens::{TokenService, VerifyError};
