//! Tavily search API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SearchProvider, SearchResult, DEFAULT_MAX_RESULTS};
use crate::error::BriefError;
use crate::provider::http::{bearer_headers, build_client, check_response, require_key};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Tavily `/search` client bound to one API key.
pub struct TavilyClient {
    api_key: String,
    base_url: String,
    max_results: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

impl TavilyClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, BriefError> {
        require_key("tavily", &api_key)?;
        bearer_headers(&api_key)?;
        Ok(Self {
            api_key,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_results: DEFAULT_MAX_RESULTS,
            client: build_client()?,
        })
    }

    /// Cap the number of hits per query. Zero is rejected.
    pub fn with_max_results(mut self, max_results: usize) -> Result<Self, BriefError> {
        if max_results == 0 {
            return Err(BriefError::Configuration(
                "max_results must be at least 1".into(),
            ));
        }
        self.max_results = max_results;
        Ok(self)
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, BriefError> {
        let url = format!("{}/search", self.base_url);
        debug!(query, max_results = self.max_results, "Tavily search");

        let resp = self
            .client
            .post(&url)
            .headers(bearer_headers(&self.api_key)?)
            .json(&SearchRequest {
                query,
                max_results: self.max_results,
                search_depth: "advanced",
                include_answer: false,
                include_raw_content: false,
                include_images: false,
            })
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let mut data: SearchResponse = resp.json().await?;
        data.results.truncate(self.max_results);
        Ok(data.results)
    }
}
