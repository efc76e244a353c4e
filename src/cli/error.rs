//! CLI error types and conversions

use crate::auth::AuthError;
use crate::fetcher::FetchError;
use crate::output::OutputError;
use crate::transport::TransportError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Fetch error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Auth error
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Transport error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
