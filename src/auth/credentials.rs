//! Static API credentials loaded from a local secrets file

use std::path::Path;

use serde::Deserialize;

use super::{AuthError, AuthResult};

/// Client and user credentials for the token endpoint.
///
/// Loaded once at startup from a JSON file:
///
/// ```json
/// {
///   "client_id": "...",
///   "client_secret": "...",
///   "username": "...",
///   "password": "..."
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// OAuth2 client identifier
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Load credentials from a JSON file.
    ///
    /// # Errors
    /// Returns [`AuthError::Credentials`] if the file is missing, unreadable,
    /// or not the expected shape.
    pub fn load(path: &Path) -> AuthResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuthError::Credentials(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            AuthError::Credentials(format!("failed to parse {}: {e}", path.display()))
        })
    }
}
