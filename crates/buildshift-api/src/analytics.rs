//! Counter-session analytics endpoint.

use buildshift_core::error::Result;
use buildshift_core::types::SessionSample;

use crate::client::ApiClient;

pub const COUNTER_SESSION_DATA: &str = "/api/rumpshift-analytics/counter-session-data/";

/// Query parameters for the counter-session endpoint.
///
/// The default query groups by user with summed aggregates, matching the
/// chart's default view.
#[derive(Debug, Clone)]
pub struct SessionQuery {
    /// Grouping column
    pub group_by: String,
    /// Aggregation function
    pub agg: String,
    /// Restrict to a single user (the leaderboard drill-down view)
    pub user: Option<String>,
}

impl Default for SessionQuery {
    fn default() -> Self {
        Self {
            group_by: "User".to_string(),
            agg: "sum".to_string(),
            user: None,
        }
    }
}

impl SessionQuery {
    /// Scope the query to one user.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }
}

impl ApiClient {
    /// Fetch aggregated counter-session samples.
    pub async fn fetch_counter_sessions(&self, query: &SessionQuery) -> Result<Vec<SessionSample>> {
        let mut params = vec![
            ("group_by", query.group_by.as_str()),
            ("agg", query.agg.as_str()),
        ];
        if let Some(user) = &query.user {
            params.push(("user", user.as_str()));
        }

        self.get_json(COUNTER_SESSION_DATA, &params).await
    }
}
