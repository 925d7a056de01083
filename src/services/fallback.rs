//! Bounded model fallback. Attempts run strictly in sequence; a new attempt
//! only starts once the previous one has been classified as failed, so a
//! flaky primary never produces duplicate side-effecting tool calls.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::{AgentError, Result};
use crate::services::model_client::{ChatModel, ChatStream};

/// One attempt within a single invocation. Ephemeral: logged, never persisted.
#[derive(Debug, Clone)]
pub struct ModelAttempt {
    pub model: String,
    pub index: usize,
    pub error_code: Option<&'static str>,
}

pub struct FallbackController {
    client: Arc<dyn ChatModel>,
    chain: Vec<String>,
    max_tokens: Option<u32>,
}

impl FallbackController {
    pub fn new(client: Arc<dyn ChatModel>, chain: Vec<String>, max_tokens: Option<u32>) -> Self {
        Self {
            client,
            chain,
            max_tokens,
        }
    }

    /// Try each model in the chain until one accepts the request. Retryable
    /// failures advance the chain; non-retryable ones short-circuit. Total
    /// attempts never exceed the chain length, and on exhaustion the last
    /// classified error surfaces.
    pub async fn invoke(
        &self,
        system_prompt: &str,
        messages: &[Value],
        tools: &[Value],
    ) -> Result<ChatStream> {
        let mut last_error: Option<AgentError> = None;

        for (index, model) in self.chain.iter().enumerate() {
            let body = build_request_body(model, system_prompt, messages, tools, self.max_tokens);

            match self.client.stream_chat(model, &body).await {
                Ok(stream) => {
                    info!(model = %model, attempt = index + 1, "model accepted request");
                    return Ok(stream);
                }
                Err(err) if !err.is_retryable() => {
                    let attempt = ModelAttempt {
                        model: model.clone(),
                        index,
                        error_code: Some(err.error_code()),
                    };
                    error!(
                        model = %attempt.model,
                        attempt = attempt.index + 1,
                        code = attempt.error_code.unwrap_or_default(),
                        "model call failed with non-retryable error"
                    );
                    return Err(err);
                }
                Err(err) => {
                    let attempt = ModelAttempt {
                        model: model.clone(),
                        index,
                        error_code: Some(err.error_code()),
                    };
                    warn!(
                        model = %attempt.model,
                        attempt = attempt.index + 1,
                        code = attempt.error_code.unwrap_or_default(),
                        "model call failed, advancing fallback chain"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AgentError::Config("model chain is empty".to_string())))
    }
}

fn build_request_body(
    model: &str,
    system_prompt: &str,
    messages: &[Value],
    tools: &[Value],
    max_tokens: Option<u32>,
) -> Value {
    let mut wire_messages = Vec::with_capacity(messages.len() + 1);
    wire_messages.push(json!({ "role": "system", "content": system_prompt }));
    wire_messages.extend(messages.iter().cloned());

    let mut body = json!({
        "model": model,
        "messages": wire_messages,
        "stream": true,
    });

    if !tools.is_empty() {
        body["tools"] = Value::Array(tools.to_vec());
        body["tool_choice"] = json!("auto");
    }

    if let Some(max_tokens) = max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    body
}
