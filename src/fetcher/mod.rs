//! The paginated fetch-and-checkpoint loop
//!
//! [`PostFetcher`] drives the whole pipeline for one target: obtain a bearer
//! token, request the page the cursor points at, partition and append the
//! records into the output collections, advance and persist the cursor, and
//! repeat until the server reports nothing left.
//!
//! After every successful page the on-disk state (collections + cursor)
//! reflects exactly that page, so a crash loses at most the in-flight page.
//! A crash between the collection writes and the cursor write replays that
//! page on the next run; resumption is at-least-once, not exactly-once.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthError, TokenManager};
use crate::config::{DEFAULT_LOOKBACK_DAYS, DEFAULT_PAGE_SIZE, MAX_PAGES, POSTS_PATH};
use crate::output::{OutputError, PostSink, TargetPaths};
use crate::resume::{Cursor, CursorStore, ResumeError};
use crate::shutdown::SharedShutdown;
use crate::transport::{ThrottledClient, TransportError};
use crate::{Post, PostPage};

/// Fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Request failed fatally or exhausted its retries
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Token acquisition or refresh failed
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cursor could not be loaded or persisted
    #[error("resume error: {0}")]
    Resume(#[from] ResumeError),

    /// A collection could not be read or written
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// The posts endpoint answered with an unusable body
    #[error("invalid posts page: {0}")]
    InvalidPage(String),

    /// The loop exceeded the page safety ceiling
    #[error("page limit ({0}) exceeded, possible non-terminating pagination")]
    PageLimitExceeded(usize),
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Per-run record counts. The authoritative totals live in the on-disk
/// collections; this summary only describes what the current run added.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchSummary {
    /// Pages committed by this run
    pub pages: u32,
    /// Records with a non-empty body added by this run
    pub with_content: u64,
    /// Records lacking a body added by this run
    pub without_content: u64,
    /// Whether the run stopped early at a shutdown request
    pub interrupted: bool,
}

impl FetchSummary {
    /// Total records added by this run.
    pub fn total(&self) -> u64 {
        self.with_content + self.without_content
    }
}

/// Split a page's records by the content predicate.
pub fn partition_by_content(posts: &[Post]) -> (Vec<&Post>, Vec<&Post>) {
    posts.iter().partition(|p| p.has_content())
}

/// Drives the fetch loop for a target.
pub struct PostFetcher {
    transport: Arc<ThrottledClient>,
    tokens: TokenManager,
    posts_url: String,
    out_root: PathBuf,
    page_size: u32,
    lookback_days: i64,
    shutdown: Option<SharedShutdown>,
}

impl PostFetcher {
    /// Create a fetcher writing under `out_root`.
    ///
    /// The transport should be the same instance the token manager uses, so
    /// token and page requests share one per-host throttle clock.
    pub fn new(
        transport: Arc<ThrottledClient>,
        tokens: TokenManager,
        api_base: impl AsRef<str>,
        out_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            tokens,
            posts_url: format!("{}{}", api_base.as_ref(), POSTS_PATH),
            out_root: out_root.into(),
            page_size: DEFAULT_PAGE_SIZE,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            shutdown: None,
        }
    }

    /// Override the page size used when synthesizing a fresh cursor.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Override the lookback window used when synthesizing a fresh cursor.
    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    /// Attach a shutdown handle; the loop stops at the next page boundary
    /// after a shutdown request, leaving committed state ready for resume.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Fetch every remaining page for `target`.
    ///
    /// Resumes from the persisted cursor when one exists. Any error aborts
    /// the run and propagates; on-disk state stays at the last committed
    /// page, so a later run picks up from there.
    ///
    /// # Errors
    /// [`FetchError`] wrapping the failing subsystem.
    pub async fn fetch(&mut self, target: &str) -> FetchResult<FetchSummary> {
        let paths = TargetPaths::new(&self.out_root, target);
        paths.ensure_directories()?;

        let store = CursorStore::new(paths.cursor_file());
        let mut cursor = match store.load()? {
            Some(cursor) => cursor,
            None => {
                info!(profile = paths.target(), lookback_days = self.lookback_days, "starting fresh fetch");
                Cursor::initial(paths.target(), self.page_size, self.lookback_days)
            }
        };

        let all_sink = PostSink::new(paths.all_posts_file());
        let with_sink = PostSink::new(paths.with_content_file());
        let without_sink = PostSink::new(paths.without_content_file());

        let mut summary = FetchSummary::default();

        loop {
            if summary.pages as usize >= MAX_PAGES {
                return Err(FetchError::PageLimitExceeded(MAX_PAGES));
            }

            let token = self.tokens.bearer().await?;
            let request = self
                .transport
                .get(&self.posts_url)
                .query(&cursor.to_query())
                .bearer_auth(&token);
            let response = self.transport.send(request).await?;
            let page: PostPage = response
                .json()
                .await
                .map_err(|e| FetchError::InvalidPage(e.to_string()))?;

            let remaining = page.meta.total_count;
            let (with_content, without_content) = partition_by_content(&page.data);

            with_sink.append(&with_content)?;
            without_sink.append(&without_content)?;
            let all: Vec<&Post> = page.data.iter().collect();
            let stored_total = all_sink.append(&all)?;

            summary.pages += 1;
            summary.with_content += with_content.len() as u64;
            summary.without_content += without_content.len() as u64;

            if let Some(last) = page.data.last() {
                cursor.advance(last.id);
            }
            store.save(&cursor)?;

            info!(
                profile = paths.target(),
                page = summary.pages,
                records = page.data.len(),
                with_content = with_content.len(),
                without_content = without_content.len(),
                stored_total,
                remaining,
                "page committed"
            );

            if remaining <= 1 {
                info!(profile = paths.target(), pages = summary.pages, "pagination complete");
                break;
            }

            if page.data.is_empty() {
                warn!(
                    profile = paths.target(),
                    remaining, "empty page with records remaining, stopping"
                );
                break;
            }

            if let Some(shutdown) = &self.shutdown {
                if shutdown.is_requested() {
                    info!(profile = paths.target(), "shutdown requested, stopping at page boundary");
                    summary.interrupted = true;
                    break;
                }
            }
        }

        Ok(summary)
    }
}
