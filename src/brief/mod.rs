//! Topic-to-brief generation.
//!
//! [`BriefGenerator`] owns three small pieces of logic: the fixed prompt
//! template, passing the thread id through to the agent loop, and picking the
//! last assistant message out of what the loop returns. Everything else
//! (model calls, search, memory) lives behind the [`AgentLoop`] it drives.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent_loop::{AgentLoop, LoopLimits, ReactLoop};
use crate::config::BriefConfig;
use crate::error::BriefError;
use crate::memory::{FileMemoryStore, InMemoryStore, MemoryStore};
use crate::models::AnthropicModel;
use crate::provider::AnthropicProvider;
use crate::search::{web_search_tool, TavilyClient};
use crate::types::{ModelMessage, Role};

/// Thread used when the caller does not name one.
pub const DEFAULT_THREAD_ID: &str = "default_thread";

/// Returned when the loop produced no assistant message at all.
pub const FALLBACK_BRIEF: &str = "Failed to generate research brief.";

/// One brief request: a topic and the conversation thread it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefRequest {
    pub topic: String,
    pub thread_id: String,
}

impl BriefRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            thread_id: DEFAULT_THREAD_ID.to_string(),
        }
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = thread_id.into();
        self
    }
}

/// Build the instruction sent for `topic`.
///
/// The topic is interpolated as-is; callers passing untrusted input are
/// responsible for sanitizing it.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "Generate a concise research brief on '{topic}'. \
         Use the search tool to gather information. \
         Format the output as:\n\
         ## Research Brief: {topic}\n\
         ### Key Points\n- Point 1\n- Point 2\n- Point 3\n\
         ### Sources\n- Source 1\n- Source 2"
    )
}

/// Text of the most recent assistant message, if any.
pub fn last_assistant_text(messages: &[ModelMessage]) -> Option<String> {
    messages
        .iter()
        .rev()
        .find(|msg| msg.role == Role::Assistant)
        .map(ModelMessage::text)
}

/// Final brief text, or [`FALLBACK_BRIEF`] when no assistant message exists.
pub fn extract_brief(messages: &[ModelMessage]) -> String {
    last_assistant_text(messages).unwrap_or_else(|| FALLBACK_BRIEF.to_string())
}

/// Generates research briefs by driving a tool-using agent loop.
///
/// # Example
/// ```no_run
/// use research_brief::brief::BriefGenerator;
///
/// # async fn example() -> research_brief::error::Result<()> {
/// let generator = BriefGenerator::new("sk-ant-...", "tvly-...", None)?;
/// let brief = generator
///     .generate_brief("Impact of renewable energy on job markets", None)
///     .await?;
/// println!("{brief}");
/// # Ok(())
/// # }
/// ```
pub struct BriefGenerator {
    agent: Arc<dyn AgentLoop>,
    model_id: String,
}

impl std::fmt::Debug for BriefGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BriefGenerator")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

impl BriefGenerator {
    /// Wire an Anthropic model, Tavily search (5 results per query) and a
    /// fresh in-process memory store into a [`ReactLoop`].
    ///
    /// `model` falls back to [`crate::models::DEFAULT_MODEL`] when `None` or
    /// blank. Blank or malformed credentials fail here; no request is sent.
    pub fn new(
        anthropic_api_key: impl Into<String>,
        tavily_api_key: impl Into<String>,
        model: Option<&str>,
    ) -> Result<Self, BriefError> {
        let provider = AnthropicProvider::new(
            AnthropicModel::from_optional(model),
            anthropic_api_key.into(),
            None,
        )?;
        let search = TavilyClient::new(tavily_api_key.into(), None)?;
        let model_id = provider.model().as_str().to_string();
        let agent = ReactLoop::new(Arc::new(provider), Arc::new(InMemoryStore::new()))
            .with_tool(web_search_tool(Arc::new(search)));
        Ok(Self {
            agent: Arc::new(agent),
            model_id,
        })
    }

    /// Build from layered configuration (env, `.env`, code overrides).
    ///
    /// Limits are validated first: a zero turn budget or zero timeout is a
    /// [`BriefError::Configuration`] whichever layer supplied it.
    pub fn from_config(config: &BriefConfig) -> Result<Self, BriefError> {
        let limits = LoopLimits::new(config.max_turns(), config.timeout())?;
        let anthropic_key = config
            .anthropic_api_key()
            .ok_or_else(|| BriefError::Authentication("Missing ANTHROPIC_API_KEY".into()))?;
        let tavily_key = config
            .tavily_api_key()
            .ok_or_else(|| BriefError::Authentication("Missing TAVILY_API_KEY".into()))?;

        let provider = AnthropicProvider::new(
            AnthropicModel::from_optional(config.model().as_deref()),
            anthropic_key,
            config.anthropic_base_url(),
        )?;
        let search = TavilyClient::new(tavily_key, config.tavily_base_url())?
            .with_max_results(config.max_results())?;
        let store: Arc<dyn MemoryStore> = match config.memory_dir() {
            Some(dir) => Arc::new(FileMemoryStore::new(dir)),
            None => Arc::new(InMemoryStore::new()),
        };

        let model_id = provider.model().as_str().to_string();
        let agent = ReactLoop::new(Arc::new(provider), store)
            .with_tool(web_search_tool(Arc::new(search)))
            .with_settings(config.generation_settings())
            .with_limits(limits);
        Ok(Self {
            agent: Arc::new(agent),
            model_id,
        })
    }

    /// Use an externally supplied loop (fakes in tests, custom orchestration).
    pub fn with_agent_loop(agent: Arc<dyn AgentLoop>, model_id: impl Into<String>) -> Self {
        Self {
            agent,
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Generate a brief for `topic` on `thread_id` (default
    /// [`DEFAULT_THREAD_ID`]).
    ///
    /// Reusing a thread id continues that conversation. Provider, search and
    /// store errors are returned unchanged; a run with no assistant message
    /// yields [`FALLBACK_BRIEF`].
    pub async fn generate_brief(
        &self,
        topic: &str,
        thread_id: Option<&str>,
    ) -> Result<String, BriefError> {
        let request = match thread_id {
            Some(id) => BriefRequest::new(topic).with_thread_id(id),
            None => BriefRequest::new(topic),
        };
        self.generate(&request).await
    }

    /// Same as [`Self::generate_brief`] for a prepared request.
    pub async fn generate(&self, request: &BriefRequest) -> Result<String, BriefError> {
        debug!(thread_id = %request.thread_id, model = %self.model_id, "generating brief");
        let messages = self
            .agent
            .submit(
                vec![ModelMessage::user(build_prompt(&request.topic))],
                &request.thread_id,
            )
            .await?;

        match last_assistant_text(&messages) {
            Some(brief) => {
                info!(thread_id = %request.thread_id, chars = brief.len(), "brief generated");
                Ok(brief)
            }
            None => {
                warn!(thread_id = %request.thread_id, "no assistant message in agent output");
                Ok(FALLBACK_BRIEF.to_string())
            }
        }
    }
}
