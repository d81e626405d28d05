//! AQL search (`/api/v1/search/`).
//!
//! Runs an Armis Query Language expression and returns one page of results.
//! Result rows are returned as raw JSON because their shape depends on the
//! queried entity (`in:devices`, `in:alerts`, ...) and the requested fields.

use serde::{Deserialize, Serialize};

use crate::client::{ApiResponse, ArmisClient};
use crate::error::Result;

/// Query-string parameters for a search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchQuery {
    /// The AQL expression, e.g. `in:devices riskLevel:High`.
    pub aql: String,
    /// Offset of the first result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    /// Maximum number of results to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// Comma-separated list of fields to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

impl SearchQuery {
    /// A query for `aql` with the server's default page and fields.
    pub fn new(aql: impl Into<String>) -> Self {
        SearchQuery {
            aql: aql.into(),
            ..Default::default()
        }
    }

    /// Restricts the page window.
    pub fn page(mut self, from: u64, length: u64) -> Self {
        self.from = Some(from);
        self.length = Some(length);
        self
    }

    /// Restricts the returned fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = fields
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.fields = Some(joined);
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    /// Number of rows on this page.
    #[serde(default)]
    pub count: u64,
    /// Offset of the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<u64>,
    /// Offset of the previous page, `None` on the first page.
    #[serde(default)]
    pub prev: Option<u64>,
    /// Total number of matching rows.
    #[serde(default)]
    pub total: Option<u64>,
    /// Result rows; their shape depends on the queried entity.
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Runs an AQL query.
///
/// # Errors
///
/// - `ArmisError::Api`: e.g. 400 for a malformed AQL expression.
/// - `ArmisError::Auth`: token refresh failed.
/// - `ArmisError::Network`: transport-level failure.
pub async fn search(client: &ArmisClient, query: &SearchQuery) -> Result<SearchResults> {
    let path = client.api_path("search/");
    let response: ApiResponse<SearchResults> = client.get_with_query(&path, query).await?;
    Ok(response.data)
}
