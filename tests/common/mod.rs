//! Shared test helpers: a canned agent loop and a scripted model provider.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use research_brief::agent_loop::AgentLoop;
use research_brief::error::BriefError;
use research_brief::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use research_brief::types::*;

/// Agent loop that records submissions and returns a fixed message list.
pub struct CannedLoop {
    output: Vec<ModelMessage>,
    pub submissions: Mutex<Vec<(Vec<ModelMessage>, String)>>,
}

impl CannedLoop {
    pub fn new(output: Vec<ModelMessage>) -> Self {
        Self {
            output,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn last_thread_id(&self) -> Option<String> {
        self.submissions.lock().unwrap().last().map(|(_, id)| id.clone())
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.submissions
            .lock()
            .unwrap()
            .last()
            .and_then(|(messages, _)| messages.first().map(ModelMessage::text))
    }
}

#[async_trait]
impl AgentLoop for CannedLoop {
    async fn submit(
        &self,
        messages: Vec<ModelMessage>,
        thread_id: &str,
    ) -> Result<Vec<ModelMessage>, BriefError> {
        self.submissions
            .lock()
            .unwrap()
            .push((messages, thread_id.to_string()));
        Ok(self.output.clone())
    }
}

/// Agent loop that always fails with a rate-limit error.
pub struct FailingLoop;

#[async_trait]
impl AgentLoop for FailingLoop {
    async fn submit(
        &self,
        _messages: Vec<ModelMessage>,
        _thread_id: &str,
    ) -> Result<Vec<ModelMessage>, BriefError> {
        Err(BriefError::RateLimited {
            retry_after_ms: Some(1000),
        })
    }
}

/// Provider that replies with queued responses and records every request.
pub struct MockProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
    pub requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
                ..Default::default()
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        });
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push_back(ProviderResponse {
            text: String::new(),
            usage: Usage::default(),
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
        });
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, BriefError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BriefError::Provider {
                provider: "mock".into(),
                message: "no queued response".into(),
            })
    }
}
