//! Web search capability exposed to the model as a tool.

pub mod tavily;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BriefError;
use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolExecutionContext};

pub use tavily::TavilyClient;

/// Name the search tool is declared under.
pub const SEARCH_TOOL_NAME: &str = "tavily_search_results_json";

/// Results returned per query unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 5;

const SEARCH_TOOL_DESCRIPTION: &str = "A search engine optimized for comprehensive, accurate, \
and trusted results. Useful for when you need to answer questions about current events. \
Input should be a search query.";

/// One ranked search hit with enough metadata to cite it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

/// Search capability: a query in, at most `max_results` ranked hits out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, BriefError>;
}

/// Wrap a search provider as the model-facing search tool.
///
/// The tool output is a JSON array of `{title, url, content}` objects in rank
/// order.
pub fn web_search_tool(provider: Arc<dyn SearchProvider>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        SEARCH_TOOL_NAME,
        SEARCH_TOOL_DESCRIPTION,
        AgentToolParameters::object()
            .string("query", "search query to look up", true)
            .build(),
        move |args, _ctx: ToolExecutionContext| {
            let provider = Arc::clone(&provider);
            async move {
                let SearchArgs { query } = args.deserialize()?;
                let results = provider.search(&query).await?;
                debug!(query = %query, hits = results.len(), "web search completed");
                let hits: Vec<serde_json::Value> = results
                    .into_iter()
                    .map(|r| {
                        serde_json::json!({
                            "title": r.title,
                            "url": r.url,
                            "content": r.content,
                        })
                    })
                    .collect();
                Ok(serde_json::Value::Array(hits))
            }
        },
    ))
}
