//! Fetch command implementation

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::auth::{Credentials, TokenManager};
use crate::config;
use crate::fetcher::PostFetcher;
use crate::shutdown::SharedShutdown;
use crate::transport::ThrottledClient;

use super::report::ReportArgs;
use super::CliError;

/// Download social media posts with resume support.
#[derive(Debug, Parser)]
#[command(name = "social-post-downloader", version, about)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch all posts for a target profile, resuming where a previous run
    /// stopped
    Fetch(FetchArgs),
    /// Print aggregate statistics for an already-fetched target
    Report(ReportArgs),
}

/// Arguments for the fetch command
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Target topic/profile identifier
    pub target: String,

    /// Path to the credentials JSON file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Root directory for fetched collections and state
    #[arg(long, default_value = "posts")]
    pub out_dir: PathBuf,

    /// API base URL
    #[arg(long, default_value = config::DEFAULT_API_BASE)]
    pub api_base: String,

    /// Minimum seconds between requests to the same host, also used as the
    /// retry backoff
    #[arg(long, default_value_t = config::DEFAULT_DELAY_SECS)]
    pub delay: u64,

    /// Attempt budget per request
    #[arg(long, default_value_t = config::MAX_RETRIES)]
    pub max_retries: u32,

    /// Records requested per page
    #[arg(long, default_value_t = config::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Days of history to request when starting fresh
    #[arg(long, default_value_t = config::DEFAULT_LOOKBACK_DAYS)]
    pub lookback_days: i64,
}

impl FetchArgs {
    /// Run the fetch loop to completion or first fatal error.
    ///
    /// # Errors
    /// Returns [`CliError`] when arguments are invalid or any pipeline stage
    /// fails.
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        if self.target.trim().is_empty() {
            return Err(CliError::InvalidArgument(
                "target must not be empty".to_string(),
            ));
        }

        let credentials = Credentials::load(&self.credentials)?;
        let transport = Arc::new(ThrottledClient::new(
            Duration::from_secs(self.delay),
            self.max_retries,
        )?);
        let tokens = TokenManager::new(transport.clone(), credentials, &self.api_base);

        let mut fetcher = PostFetcher::new(transport, tokens, &self.api_base, &self.out_dir)
            .with_page_size(self.page_size)
            .with_lookback_days(self.lookback_days)
            .with_shutdown(shutdown);

        let summary = fetcher.fetch(&self.target).await?;

        info!(
            profile = %self.target,
            pages = summary.pages,
            with_content = summary.with_content,
            without_content = summary.without_content,
            total = summary.total(),
            interrupted = summary.interrupted,
            "fetch finished"
        );
        Ok(())
    }
}
