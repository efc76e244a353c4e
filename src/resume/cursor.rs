//! The pagination cursor
//!
//! A [`Cursor`] is the full query-parameter set for the next page request.
//! It serializes under the upstream parameter names, so the persisted state
//! file is exactly the query that resumes the fetch.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::SORT_ORDER;

/// Durable pointer to the pagination position plus filter parameters.
///
/// Pagination is ascending by publish date: the position marker (`sinceId`)
/// is replaced with the identifier of the last record of each fetched page,
/// and every other field is carried forward unchanged. Re-applying a cursor
/// requests the same page again, which makes resume idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    /// Topic profile identifier being fetched
    pub topics: String,
    /// Page size
    pub limit: u32,
    /// Lower bound on publish time, epoch milliseconds
    #[serde(rename = "startDate")]
    pub start_date: i64,
    /// Requested sort order
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    /// Identifier of the last record already fetched, if any
    #[serde(rename = "sinceId", skip_serializing_if = "Option::is_none")]
    pub since_id: Option<i64>,
}

impl Cursor {
    /// Synthesize the initial cursor for a target: no position marker,
    /// publish-time lower bound `lookback_days` in the past.
    pub fn initial(target: &str, page_size: u32, lookback_days: i64) -> Self {
        let start = Utc::now() - chrono::Duration::days(lookback_days);
        Self {
            topics: target.to_string(),
            limit: page_size,
            start_date: start.timestamp() * 1000,
            sort_by: SORT_ORDER.to_string(),
            since_id: None,
        }
    }

    /// Advance the position marker to the given record identifier.
    pub fn advance(&mut self, last_id: i64) {
        self.since_id = Some(last_id);
    }

    /// The cursor as request query parameters.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("topics", self.topics.clone()),
            ("limit", self.limit.to_string()),
            ("startDate", self.start_date.to_string()),
            ("sortBy", self.sort_by.clone()),
        ];
        if let Some(id) = self.since_id {
            params.push(("sinceId", id.to_string()));
        }
        params
    }
}
