//! ReAct-style loop: model turn, sequential tool calls, repeat.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{AgentLoop, LoopLimits};
use crate::error::BriefError;
use crate::memory::MemoryStore;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::*;
use crate::util::timeout::with_timeout;

/// Tool-calling loop over one provider, a fixed tool set and a memory store.
///
/// Submissions for the same thread id are serialized; different threads run
/// concurrently. A submission that fails leaves the stored thread untouched.
pub struct ReactLoop {
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Arc<dyn Tool>>,
    store: Arc<dyn MemoryStore>,
    settings: GenerationSettings,
    limits: LoopLimits,
    system_prompt: Option<String>,
    thread_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ReactLoop {
    pub fn new(provider: Arc<dyn ModelProvider>, store: Arc<dyn MemoryStore>) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            store,
            settings: GenerationSettings::default(),
            limits: LoopLimits::default(),
            system_prompt: None,
            thread_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Sampling settings sent with every provider call.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_limits(mut self, limits: LoopLimits) -> Self {
        self.limits = limits;
        self
    }

    /// System prompt sent with every request; never stored in the thread.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    fn thread_lock(&self, thread_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.thread_locks.lock().unwrap_or_else(|p| p.into_inner());
        // Idle entries are held only by the map.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(thread_id.to_string()).or_default())
    }

    fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.tools.is_empty() {
            None
        } else {
            Some(self.tools.iter().map(|t| t.definition()).collect())
        }
    }

    async fn run(
        &self,
        messages: Vec<ModelMessage>,
        thread_id: &str,
    ) -> Result<Vec<ModelMessage>, BriefError> {
        let mut conversation = self.store.get_history(thread_id).await?;
        let history_len = conversation.len();
        conversation.extend(messages);

        let tool_defs = self.tool_definitions();
        let ctx = ToolExecutionContext {
            thread_id: Some(thread_id.to_string()),
        };
        let mut usage = Usage::default();

        for turn in 0..self.limits.max_turns {
            let mut request_messages = Vec::with_capacity(conversation.len() + 1);
            if let Some(ref system) = self.system_prompt {
                request_messages.push(ModelMessage::system(system.clone()));
            }
            request_messages.extend(conversation.iter().cloned());

            debug!(thread_id, turn, "agent loop: calling provider");
            let response = self
                .provider
                .generate_text(&ProviderRequest {
                    messages: request_messages,
                    settings: self.settings.clone(),
                    tools: tool_defs.clone(),
                })
                .await?;
            usage.merge(&response.usage);
            debug!(thread_id, turn, finish_reason = ?response.finish_reason, "provider turn done");
            if response.finish_reason == Some(FinishReason::Length) {
                warn!(thread_id, turn, "model output truncated at max_tokens");
            }

            let calls = response.tool_calls;
            conversation.push(ModelMessage::assistant_with_tool_calls(
                response.text,
                calls.clone(),
            ));

            if calls.is_empty() {
                self.store
                    .append(thread_id, &conversation[history_len..])
                    .await?;
                info!(
                    thread_id,
                    turns = turn + 1,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "agent loop finished"
                );
                return Ok(conversation);
            }

            for call in &calls {
                conversation.push(self.execute_tool(call, &ctx).await);
            }
        }

        warn!(thread_id, max_turns = self.limits.max_turns, "agent loop hit turn limit");
        Err(BriefError::IterationLimit(self.limits.max_turns))
    }

    /// Failures become error results for the model to read, not loop errors.
    async fn execute_tool(&self, call: &AgentToolCall, ctx: &ToolExecutionContext) -> ModelMessage {
        match self.try_execute_tool(call, ctx).await {
            Ok(value) => ModelMessage::tool_result(call.id.clone(), value, false),
            Err(e) => {
                warn!(tool = call.name, error = %e, "Tool execution failed");
                ModelMessage::tool_result(
                    call.id.clone(),
                    serde_json::json!({"error": e.to_string()}),
                    true,
                )
            }
        }
    }

    async fn try_execute_tool(
        &self,
        call: &AgentToolCall,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, BriefError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == call.name)
            .ok_or_else(|| BriefError::ToolExecution {
                tool_name: call.name.clone(),
                message: "tool not found".into(),
            })?;

        let args = ToolArguments::new(call.arguments.clone());
        tool.execute(&args, ctx)
            .await
            .map_err(|e| BriefError::ToolExecution {
                tool_name: call.name.clone(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl AgentLoop for ReactLoop {
    async fn submit(
        &self,
        messages: Vec<ModelMessage>,
        thread_id: &str,
    ) -> Result<Vec<ModelMessage>, BriefError> {
        let lock = self.thread_lock(thread_id);
        let _guard = lock.lock().await;
        match self.limits.timeout {
            Some(limit) => with_timeout(limit, self.run(messages, thread_id)).await,
            None => self.run(messages, thread_id).await,
        }
    }
}
