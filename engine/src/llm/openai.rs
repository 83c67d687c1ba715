//! OpenAI-compatible chat completions provider
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol with
//! native function calling (OpenRouter, OpenAI, local gateways).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{LLMError, LLMProvider, LLMResponse, Message, ToolCall, ToolDefinition};
use crate::config::LLMConfig;
use crate::secrets::{scrub, SecretString};

pub struct OpenAICompatibleProvider {
    config: LLMConfig,
    api_key: SecretString,
    client: reqwest::Client,
}

impl OpenAICompatibleProvider {
    pub fn new(config: LLMConfig, api_key: SecretString) -> Self {
        Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Convert the log into the wire `messages` array, system first
    fn convert_messages(system: &str, messages: &[Message]) -> Vec<Value> {
        let mut api_messages = Vec::with_capacity(messages.len() + 1);
        api_messages.push(json!({ "role": "system", "content": system }));

        for msg in messages {
            let value = match msg {
                Message::System(m) => json!({ "role": "system", "content": m.content }),
                Message::User(m) => json!({ "role": "user", "content": m.content }),
                Message::Assistant(m) if m.tool_calls.is_empty() => {
                    json!({ "role": "assistant", "content": m.content })
                }
                Message::Assistant(m) => {
                    let calls: Vec<Value> = m
                        .tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": { "name": call.name, "arguments": call.arguments }
                            })
                        })
                        .collect();
                    let content = if m.content.is_empty() {
                        Value::Null
                    } else {
                        Value::String(m.content.clone())
                    };
                    json!({ "role": "assistant", "content": content, "tool_calls": calls })
                }
                Message::ToolResult(m) => json!({
                    "role": "tool",
                    "tool_call_id": m.tool_call_id,
                    "content": m.content
                }),
            };
            api_messages.push(value);
        }

        api_messages
    }

    fn convert_tools(tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters
                    }
                })
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,

    // Some backends send an explicit null on text-only replies
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,

    #[serde(default)]
    arguments: Option<String>,
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn generate(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> super::Result<LLMResponse> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let mut payload = json!({
            "model": self.config.model,
            "messages": Self::convert_messages(system, messages),
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });
        if !tools.is_empty() {
            payload["tools"] = Value::Array(Self::convert_tools(tools));
        }

        tracing::debug!(
            "Chat completion request: model={}, messages={}, tools={}",
            self.config.model,
            messages.len() + 1,
            tools.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.unsecure()))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else if e.is_connect() {
                    LLMError::ProviderUnavailable(format!(
                        "Cannot connect to {}",
                        self.config.base_url
                    ))
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = scrub(&response.text().await.unwrap_or_default());

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LLMError::AuthenticationFailed(text));
            } else if status.as_u16() == 429 {
                return Err(LLMError::RateLimitExceeded);
            } else {
                return Err(LLMError::InvalidRequest(format!("HTTP {}: {}", status, text)));
            }
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                ToolCall::new(
                    call.id,
                    call.function.name,
                    call.function.arguments.unwrap_or_default(),
                )
            })
            .collect();

        Ok(LLMResponse::with_tool_calls(
            choice.message.content.unwrap_or_default(),
            tool_calls,
        ))
    }
}
