//! Default configuration constants for the fetch pipeline

use std::time::Duration;

/// Base URL of the Social Studio API.
pub const DEFAULT_API_BASE: &str = "https://api.socialstudio.radian6.com";

/// Token endpoint path, relative to the API base.
pub const TOKEN_PATH: &str = "/oauth/token";

/// Posts endpoint path, relative to the API base.
pub const POSTS_PATH: &str = "/v3/posts";

/// Maximum number of attempts for a single request.
/// 5 attempts rides out transient failures and rate-limit windows while
/// keeping a persistently broken endpoint from looping forever.
pub const MAX_RETRIES: u32 = 5;

/// Minimum spacing between consecutive requests to the same host, and the
/// fixed sleep applied before each retry.
pub const DEFAULT_DELAY_SECS: u64 = 10;

/// TCP connect timeout per request attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Full-response read timeout per request attempt. The posts endpoint can
/// take minutes to assemble a 1000-record page.
pub const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Safety margin subtracted from a token's lifetime. A token within this
/// window of expiry is refreshed before use so it cannot expire mid-request.
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(120);

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// How far back the initial cursor reaches when no saved state exists.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 91;

/// Sort order requested from the posts endpoint. Pagination advances via
/// `sinceId`, which assumes ascending publish order.
pub const SORT_ORDER: &str = "publishedDate-ascending";

/// Hard ceiling on pages fetched in one run, guarding against a server that
/// never reports a terminal remaining count.
pub const MAX_PAGES: usize = 10_000;
