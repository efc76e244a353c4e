//! # Social Post Downloader
//!
//! A library and CLI for downloading social media posts from the Social
//! Studio API, with incremental on-disk persistence and restart-safe resume.
//!
//! ## Features
//!
//! - **Resilient Pagination**: cursor-based fetch loop that survives network
//!   flakiness, rate limits, and process restarts
//! - **Checkpointing**: the cursor for the next page is persisted after every
//!   committed page, so an interrupted run resumes where it left off
//! - **Throttling**: per-host minimum delay between requests with bounded
//!   retry on transient failures
//! - **OAuth2 Tokens**: password-grant acquisition with refresh-grant renewal
//! - **Partitioned Output**: posts are split into with-content and
//!   without-content collections alongside the combined collection
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use social_post_downloader::auth::{Credentials, TokenManager};
//! use social_post_downloader::fetcher::PostFetcher;
//! use social_post_downloader::transport::ThrottledClient;
//! use social_post_downloader::config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(ThrottledClient::new(
//!     Duration::from_secs(config::DEFAULT_DELAY_SECS),
//!     config::MAX_RETRIES,
//! )?);
//!
//! let credentials = Credentials::load("credentials.json".as_ref())?;
//! let tokens = TokenManager::new(transport.clone(), credentials, config::DEFAULT_API_BASE);
//!
//! let mut fetcher = PostFetcher::new(transport, tokens, config::DEFAULT_API_BASE, "posts");
//! let summary = fetcher.fetch("1056316").await?;
//! println!("fetched {} posts", summary.total());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`transport`] - Throttled HTTP client with bounded retry
//! - [`auth`] - Credential loading and bearer token lifecycle
//! - [`resume`] - Durable pagination cursor
//! - [`output`] - Append-only post collections and per-target file layout
//! - [`fetcher`] - The fetch-and-checkpoint loop
//! - [`report`] - Aggregate statistics over fetched collections
//!
//! ## Durability model
//!
//! After every successful page, the three output collections and the cursor
//! reflect exactly that page. A crash loses at most the in-flight page; a
//! crash between the collection writes and the cursor write replays that page
//! on resume, so resumption is at-least-once rather than exactly-once.

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Credential loading and bearer token lifecycle
pub mod auth;

/// CLI command implementations
pub mod cli;

/// Default configuration constants
pub mod config;

/// The paginated fetch-and-checkpoint loop
pub mod fetcher;

/// Append-only post collections and per-target file layout
pub mod output;

/// Aggregate statistics over fetched collections
pub mod report;

/// Durable pagination cursor
pub mod resume;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Throttled HTTP transport with bounded retry
pub mod transport;

/// A single social media post as returned by the posts endpoint.
///
/// Only the fields the pipeline inspects are typed; everything else the
/// server sends is preserved verbatim in [`extra`](Post::extra) so written
/// collections round-trip losslessly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique post identifier, also used as the pagination position marker
    pub id: i64,
    /// Post body text; absent or empty for link-only and media posts
    pub content: Option<String>,
    /// Link to the post on its source platform
    #[serde(rename = "externalLink")]
    pub external_link: Option<String>,
    /// Author details
    #[serde(default)]
    pub author: PostAuthor,
    /// Parent post reference; `None` marks a root post
    pub parent: Option<serde_json::Value>,
    /// Platform-specific post type; untyped posts carry `None`
    #[serde(rename = "postType")]
    pub post_type: Option<String>,
    /// Topic profile identifiers this post matched
    #[serde(default)]
    pub topics: Vec<i64>,
    /// Engagement metrics reported by the platform
    #[serde(rename = "postDynamics", default)]
    pub post_dynamics: Vec<PostDynamic>,
    /// All remaining upstream fields, preserved as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Post {
    /// Whether the post carries a non-empty body.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Whether the post is a root post (no parent).
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether any reported engagement metric is non-zero.
    pub fn has_engagement(&self) -> bool {
        self.post_dynamics.iter().any(|d| d.value != "0")
    }
}

/// Author details attached to a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostAuthor {
    /// Display name, if the platform exposes one
    #[serde(rename = "authorFullName")]
    pub full_name: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Remaining upstream author fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single engagement metric, e.g. likes or shares.
///
/// The server reports metric values as strings; `"0"` means no engagement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostDynamic {
    /// Metric name
    pub name: Option<String>,
    /// Metric value as reported
    pub value: String,
    /// Remaining upstream metric fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of posts from the posts endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    /// Posts in this page, in the requested sort order
    pub data: Vec<Post>,
    /// Pagination metadata
    pub meta: PageMeta,
}

/// Pagination metadata reported alongside each page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    /// Records remaining after this page (for pages), or records stored
    /// (for on-disk collections)
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}
