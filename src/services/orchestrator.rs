//! The composition root for one chat turn: load state, prompt the model
//! through the fallback chain, execute any tool calls it makes, persist the
//! updated record, and stream the reply as it arrives.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::core::conversation::{ChatMessage, Role};
use crate::error::{AgentError, Result};
use crate::services::fallback::FallbackController;
use crate::services::model_client::{ChatModel, ChatStream, HttpModelClient, StreamEvent};
use crate::services::prompt;
use crate::store::{ConversationStore, StateUpdate};
use crate::tools::{ToolCall, ToolName, ToolRegistry};
use crate::types::request::ChatRequest;

/// Assistant text chunks for one turn, in arrival order
pub type TurnStream = ReceiverStream<Result<String>>;

pub struct Orchestrator {
    config: AgentConfig,
    store: Arc<ConversationStore>,
    registry: ToolRegistry,
    controller: FallbackController,
}

impl Orchestrator {
    pub fn new(
        config: AgentConfig,
        store: Arc<ConversationStore>,
        client: Arc<dyn ChatModel>,
    ) -> Self {
        let registry = ToolRegistry::new(config.pricing.clone());
        let controller =
            FallbackController::new(client, config.model_chain.clone(), config.max_tokens);
        Self {
            config,
            store,
            registry,
            controller,
        }
    }

    /// Wire up the real HTTP model client and a fresh store from config
    pub fn from_config(config: AgentConfig) -> Result<Self> {
        let client = Arc::new(HttpModelClient::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.request_timeout,
        )?);
        let store = Arc::new(ConversationStore::new(
            config.message_retention,
            config.session_ttl,
        ));
        Ok(Self::new(config, store, client))
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handle one inbound chat turn. The first model call resolves before
    /// this returns, so classified failures map onto real HTTP statuses;
    /// afterwards the turn continues on the returned stream.
    pub async fn handle_turn(self: Arc<Self>, request: ChatRequest) -> Result<TurnStream> {
        let inbound = request.validated_messages()?;
        let context = request.conversation_context.clone().unwrap_or_default();

        let record = self.store.init(&context).await;
        let conversation_id = record.conversation_id.clone();

        // A fresh record adopts the caller's history; an existing one only
        // takes the new user message, its own trace is authoritative.
        if record.messages.is_empty() {
            for message in &inbound {
                self.store
                    .append_message(&conversation_id, message.clone())
                    .await?;
            }
        } else if let Some(last) = inbound.last().filter(|m| m.role == Role::User) {
            self.store
                .append_message(&conversation_id, last.clone())
                .await?;
        }

        let stream = self.invoke_for_current_state(&conversation_id).await?;

        let (tx, rx) = mpsc::channel(32);
        let orchestrator = Arc::clone(&self);
        let id = conversation_id.clone();
        tokio::spawn(async move {
            orchestrator.run_turn(id, stream, tx).await;
        });

        Ok(ReceiverStream::new(rx))
    }

    async fn invoke_for_current_state(&self, conversation_id: &str) -> Result<ChatStream> {
        let record = self.store.snapshot(conversation_id).await?;
        let system_prompt = prompt::build_system_prompt(&record);
        let tools = self.registry.definitions_for(record.current_step);
        self.controller
            .invoke(&system_prompt, &record.wire_messages(), &tools)
            .await
    }

    /// Drive the turn to completion: forward text, execute tool calls, and
    /// re-invoke the model until it answers without calling tools.
    async fn run_turn(
        &self,
        conversation_id: String,
        mut stream: ChatStream,
        tx: mpsc::Sender<Result<String>>,
    ) {
        for _ in 0..self.config.max_turn_iterations {
            let mut text = String::new();
            let mut pending: BTreeMap<usize, PendingToolCall> = BTreeMap::new();

            while let Some(event) = stream.next().await {
                // Client disconnected: stop consuming upstream. Tool results
                // already persisted stay persisted. The send path alone
                // cannot detect this for tool-call-only responses.
                if tx.is_closed() {
                    debug!(conversation_id = %conversation_id, "turn cancelled by consumer");
                    return;
                }
                match event {
                    Ok(StreamEvent::TextDelta(delta)) => {
                        text.push_str(&delta);
                        if tx.send(Ok(delta)).await.is_err() {
                            debug!(conversation_id = %conversation_id, "turn cancelled by consumer");
                            return;
                        }
                    }
                    Ok(StreamEvent::ToolCallDelta {
                        index,
                        id,
                        name,
                        arguments,
                    }) => {
                        let entry = pending.entry(index).or_default();
                        if let Some(id) = id {
                            entry.id = id;
                        }
                        if let Some(name) = name {
                            entry.name = name;
                        }
                        entry.arguments.push_str(&arguments);
                    }
                    Ok(StreamEvent::Finish(_)) => {}
                    Err(err) => {
                        let _ = tx.send(Err(err)).await;
                        return;
                    }
                }
            }

            if pending.is_empty() {
                if !text.is_empty() {
                    if let Err(err) = self
                        .store
                        .append_message(&conversation_id, ChatMessage::assistant(text))
                        .await
                    {
                        warn!(conversation_id = %conversation_id, error = %err, "failed to persist reply");
                    }
                }
                return;
            }

            let wire_calls: Vec<Value> =
                pending.values().map(PendingToolCall::to_wire).collect();
            if let Err(err) = self
                .store
                .append_message(
                    &conversation_id,
                    ChatMessage::assistant_with_tool_calls(
                        text,
                        Value::Array(wire_calls.clone()),
                    ),
                )
                .await
            {
                warn!(conversation_id = %conversation_id, error = %err, "failed to persist tool calls");
            }

            for wire in &wire_calls {
                self.process_tool_call(&conversation_id, wire).await;
            }

            if tx.is_closed() {
                debug!(conversation_id = %conversation_id, "turn cancelled by consumer");
                return;
            }
            match self.invoke_for_current_state(&conversation_id).await {
                Ok(next) => stream = next,
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            }
        }

        let _ = tx
            .send(Err(AgentError::MaxIterations(
                self.config.max_turn_iterations,
            )))
            .await;
    }

    /// Validate, execute, merge, and append the trace for one tool call.
    /// Failures become error payloads in the trace; they never touch the
    /// committed selection.
    async fn process_tool_call(&self, conversation_id: &str, wire: &Value) {
        let (call_id, payload) = match ToolCall::from_wire(wire) {
            Err(err) => {
                let call_id = wire
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                (call_id, err.to_error_payload())
            }
            Ok(call) => {
                let call_id = call.id.clone();
                let payload = self.execute_tool_call(conversation_id, call).await;
                (call_id, payload)
            }
        };

        if let Err(err) = self
            .store
            .append_message(conversation_id, ChatMessage::tool(call_id, payload.to_string()))
            .await
        {
            warn!(conversation_id = %conversation_id, error = %err, "failed to persist tool result");
        }
    }

    async fn execute_tool_call(&self, conversation_id: &str, call: ToolCall) -> Value {
        let tool = match call.name.parse::<ToolName>() {
            Ok(tool) => tool,
            Err(err) => {
                warn!(conversation_id = %conversation_id, tool = %call.name, "unknown tool");
                return err.to_error_payload();
            }
        };

        let record = match self.store.snapshot(conversation_id).await {
            Ok(record) => record,
            Err(err) => return err.to_error_payload(),
        };

        match self.registry.execute(tool, call.arguments, &record) {
            Ok(outcome) => {
                if outcome.selection_delta.is_some() || outcome.next_step.is_some() {
                    let update = StateUpdate {
                        delta: outcome.selection_delta.clone(),
                        step: outcome.next_step,
                    };
                    if let Err(err) = self.store.update(conversation_id, update).await {
                        warn!(conversation_id = %conversation_id, error = %err, "failed to merge tool result");
                    }
                }
                info!(
                    conversation_id = %conversation_id,
                    tool = %tool,
                    step = ?outcome.next_step,
                    "tool executed"
                );
                outcome.trace_payload()
            }
            Err(err) => {
                warn!(
                    conversation_id = %conversation_id,
                    tool = %tool,
                    code = err.error_code(),
                    "tool call rejected"
                );
                err.to_error_payload()
            }
        }
    }
}

/// Tool-call fragments accumulated from stream deltas until the response ends
#[derive(Debug, Default)]
struct PendingToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl PendingToolCall {
    fn to_wire(&self) -> Value {
        json!({
            "id": self.id,
            "type": "function",
            "function": {
                "name": self.name,
                "arguments": if self.arguments.is_empty() { "{}" } else { self.arguments.as_str() },
            }
        })
    }
}
