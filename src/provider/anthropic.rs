//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::BriefError;
use crate::models::anthropic::AnthropicModel;
use crate::types::*;

use super::http::{anthropic_headers, build_client, check_response, require_key};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    model: AnthropicModel,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicProvider {
    /// Create a provider. Fails on a blank key or a key that cannot be sent
    /// as a header; no request is made.
    pub fn new(
        model: AnthropicModel,
        api_key: String,
        base_url: Option<String>,
    ) -> Result<Self, BriefError> {
        require_key("anthropic", &api_key)?;
        anthropic_headers(&api_key, API_VERSION)?;
        Ok(Self {
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
            client: build_client()?,
        })
    }

    pub fn model(&self) -> &AnthropicModel {
        &self.model
    }

    fn build_request_body(&self, request: &ProviderRequest) -> Value {
        let mut system_parts = Vec::new();
        let mut messages = Vec::new();

        for msg in &request.messages {
            match msg.role {
                Role::System => system_parts.push(msg.text()),
                Role::User => {
                    messages.push(serde_json::json!({
                        "role": "user",
                        "content": msg.text(),
                    }));
                }
                Role::Assistant => {
                    let mut content: Vec<Value> = Vec::new();
                    for part in &msg.content {
                        match part {
                            ContentPart::Text { text } if !text.is_empty() => {
                                content.push(serde_json::json!({"type": "text", "text": text}));
                            }
                            ContentPart::ToolCall(tc) => {
                                content.push(serde_json::json!({
                                    "type": "tool_use",
                                    "id": tc.id,
                                    "name": tc.name,
                                    "input": tc.arguments,
                                }));
                            }
                            _ => {}
                        }
                    }
                    if !content.is_empty() {
                        messages.push(serde_json::json!({
                            "role": "assistant",
                            "content": content,
                        }));
                    }
                }
                Role::Tool => {
                    let results: Vec<Value> = msg
                        .content
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::ToolResult(tr) => Some(serde_json::json!({
                                "type": "tool_result",
                                "tool_use_id": tr.tool_call_id,
                                "content": tool_result_to_string(&tr.result),
                                "is_error": tr.is_error,
                            })),
                            _ => None,
                        })
                        .collect();
                    push_tool_results(&mut messages, results);
                }
            }
        }

        let mut body = serde_json::json!({
            "model": self.model.as_str(),
            "messages": messages,
            "max_tokens": request
                .settings
                .max_tokens
                .unwrap_or_else(|| self.model.default_max_tokens()),
        });

        if let Some(obj) = body.as_object_mut() {
            if !system_parts.is_empty() {
                obj.insert("system".into(), system_parts.join("\n").into());
            }
            if let Some(temp) = request.settings.temperature {
                obj.insert("temperature".into(), temp.into());
            }
            if let Some(top_p) = request.settings.top_p {
                obj.insert("top_p".into(), top_p.into());
            }
            if let Some(top_k) = request.settings.top_k {
                obj.insert("top_k".into(), top_k.into());
            }
            if let Some(ref stops) = request.settings.stop_sequences {
                obj.insert("stop_sequences".into(), serde_json::json!(stops));
            }
            if let Some(ref tools) = request.tools {
                if !tools.is_empty() {
                    let tool_defs: Vec<Value> = tools
                        .iter()
                        .map(|t| {
                            serde_json::json!({
                                "name": t.name,
                                "description": t.description,
                                "input_schema": t.parameters,
                            })
                        })
                        .collect();
                    obj.insert("tools".into(), tool_defs.into());
                }
            }
        }

        body
    }
}

/// Consecutive tool results must share a single user turn.
fn push_tool_results(messages: &mut Vec<Value>, mut results: Vec<Value>) {
    if results.is_empty() {
        return;
    }
    if let Some(last) = messages.last_mut() {
        let is_tool_turn = last["role"] == "user"
            && last["content"]
                .as_array()
                .is_some_and(|blocks| blocks.iter().all(|b| b["type"] == "tool_result"));
        if is_tool_turn {
            if let Some(blocks) = last["content"].as_array_mut() {
                blocks.append(&mut results);
                return;
            }
        }
    }
    messages.push(serde_json::json!({"role": "user", "content": results}));
}

fn tool_result_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, BriefError> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(model = self.model.as_str(), messages = request.messages.len(), "Anthropic generate_text");

        let resp = self
            .client
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION)?)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let data: AnthropicResponse = resp.json().await?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in data.content {
            match block.r#type.as_str() {
                "text" => {
                    if let Some(t) = block.text {
                        text.push_str(&t);
                    }
                }
                "tool_use" => match (block.id, block.name) {
                    (Some(id), Some(name)) => tool_calls.push(AgentToolCall {
                        id,
                        name,
                        arguments: block.input.unwrap_or_else(|| serde_json::json!({})),
                    }),
                    _ => {
                        return Err(BriefError::Provider {
                            provider: "anthropic".into(),
                            message: "tool_use block without id or name".into(),
                        })
                    }
                },
                _ => {}
            }
        }

        let finish_reason = match data.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => Some(FinishReason::Stop),
            Some("max_tokens") => Some(FinishReason::Length),
            Some("tool_use") => Some(FinishReason::ToolCalls),
            Some("refusal") => Some(FinishReason::ContentFilter),
            _ => None,
        };

        Ok(ProviderResponse {
            text,
            usage: Usage {
                input_tokens: data.usage.input_tokens,
                output_tokens: data.usage.output_tokens,
                total_tokens: data.usage.input_tokens + data.usage.output_tokens,
                cache_read_tokens: data.usage.cache_read_input_tokens,
                cache_creation_tokens: data.usage.cache_creation_input_tokens,
            },
            tool_calls,
            finish_reason,
        })
    }
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
    #[serde(default)]
    cache_read_input_tokens: Option<u32>,
    #[serde(default)]
    cache_creation_input_tokens: Option<u32>,
}
