//! OpenAI-compatible chat-completions client. Responses are consumed as a
//! server-sent-event stream and forwarded chunk by chunk; nothing buffers the
//! full body, first-byte latency matters for the chat UI.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::timeout;

use crate::error::{AgentError, Result};

/// One decoded event from the model stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of assistant text
    TextDelta(String),
    /// A fragment of a tool call; `arguments` accumulates across deltas
    ToolCallDelta {
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: String,
    },
    /// The model finished this response
    Finish(Option<String>),
}

pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// The model-calling seam: "generate text, streamed, given a request body".
/// The fallback controller and the tests both sit on this trait.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream_chat(&self, model: &str, body: &Value) -> Result<ChatStream>;
}

#[derive(Clone, Debug)]
pub struct HttpModelClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    request_timeout: Duration,
}

impl HttpModelClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| AgentError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            request_timeout,
        })
    }
}

#[async_trait]
impl ChatModel for HttpModelClient {
    async fn stream_chat(&self, _model: &str, body: &Value) -> Result<ChatStream> {
        let request = self
            .client
            .post(build_chat_url(&self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body);

        // Bounded wait for the response head; exceeding it is a timeout
        // classification, which the fallback chain treats as retryable.
        let response = timeout(self.request_timeout, request.send())
            .await
            .map_err(|_| AgentError::Timeout("model request timed out".to_string()))?
            .map_err(|err| {
                if err.is_timeout() {
                    AgentError::Timeout(format!("model request timed out: {err}"))
                } else {
                    AgentError::Network(format!("model request failed: {err}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok());
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_error_response(status, retry_after, &body_text));
        }

        let byte_stream = response.bytes_stream();
        let decoder = SseDecoder::default();

        let stream = futures::stream::unfold(
            (byte_stream, decoder),
            |(mut bytes, mut decoder)| async move {
                loop {
                    if let Some(event) = decoder.pending.pop_front() {
                        return Some((event, (bytes, decoder)));
                    }
                    if decoder.finished {
                        return None;
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => decoder.feed(&chunk),
                        Some(Err(err)) => {
                            decoder.finished = true;
                            return Some((
                                Err(AgentError::Network(format!("model stream failed: {err}"))),
                                (bytes, decoder),
                            ));
                        }
                        None => return None,
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

/// Map a non-success response onto the failure taxonomy
fn classify_error_response(
    status: StatusCode,
    retry_after: Option<u64>,
    body_text: &str,
) -> AgentError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AgentError::Authentication(format!("model endpoint rejected credentials: {status}"));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return AgentError::RateLimit {
            retry_after: retry_after.unwrap_or(1).max(1),
        };
    }

    let body_json: Option<Value> = serde_json::from_str(body_text).ok();
    let error_code = body_json
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let error_message = body_json
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(body_text);

    if error_code == "context_length_exceeded"
        || error_message.contains("context length")
        || error_message.contains("maximum context")
    {
        return AgentError::ContextLength(error_message.to_string());
    }

    if status.is_server_error() {
        return AgentError::Network(format!("HTTP {status}: {error_message}"));
    }

    AgentError::Unknown(format!("HTTP {status}: {error_message}"))
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/chat/completions")
    }
}

/// Incremental SSE decoder for the chat-completions stream format
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: String,
    pending: VecDeque<Result<StreamEvent>>,
    finished: bool,
}

impl SseDecoder {
    fn feed(&mut self, chunk: &[u8]) {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        while let Some(newline) = self.buffer.find('\n') {
            let line = self.buffer[..newline].trim_end_matches('\r').to_string();
            self.buffer.drain(..=newline);
            self.process_line(&line);
        }
    }

    fn process_line(&mut self, line: &str) {
        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim();
        if data.is_empty() {
            return;
        }
        if data == "[DONE]" {
            self.finished = true;
            return;
        }

        match serde_json::from_str::<Value>(data) {
            Ok(chunk) => self.process_chunk(&chunk),
            Err(err) => self.pending.push_back(Err(AgentError::Unknown(format!(
                "unparseable stream chunk: {err}"
            )))),
        }
    }

    fn process_chunk(&mut self, chunk: &Value) {
        let Some(choice) = chunk.get("choices").and_then(Value::as_array).and_then(|c| c.first())
        else {
            return;
        };

        if let Some(delta) = choice.get("delta") {
            if let Some(content) = delta.get("content").and_then(Value::as_str) {
                if !content.is_empty() {
                    self.pending
                        .push_back(Ok(StreamEvent::TextDelta(content.to_string())));
                }
            }
            if let Some(tool_calls) = delta.get("tool_calls").and_then(Value::as_array) {
                for tool_call in tool_calls {
                    let index = tool_call
                        .get("index")
                        .and_then(Value::as_u64)
                        .unwrap_or(0) as usize;
                    let id = tool_call
                        .get("id")
                        .and_then(Value::as_str)
                        .map(|s| s.to_string());
                    let function = tool_call.get("function");
                    let name = function
                        .and_then(|f| f.get("name"))
                        .and_then(Value::as_str)
                        .map(|s| s.to_string());
                    let arguments = function
                        .and_then(|f| f.get("arguments"))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    self.pending.push_back(Ok(StreamEvent::ToolCallDelta {
                        index,
                        id,
                        name,
                        arguments,
                    }));
                }
            }
        }

        if let Some(reason) = choice.get("finish_reason").and_then(Value::as_str) {
            self.pending
                .push_back(Ok(StreamEvent::Finish(Some(reason.to_string()))));
        }
    }
}
