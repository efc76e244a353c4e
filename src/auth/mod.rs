//! Credential loading and bearer token lifecycle

use crate::transport::TransportError;

pub mod credentials;
pub mod token;

pub use credentials::Credentials;
pub use token::{BearerToken, TokenManager};

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credentials file could not be read or parsed
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The grant exchange request failed
    #[error("token exchange failed: {0}")]
    Exchange(#[from] TransportError),

    /// The token endpoint answered with an unusable body
    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
