use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::booking::{BookingSelection, BookingStep};
use crate::types::request::ConversationContext;

/// Message author role, matching the chat-completions wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One message in the conversation trace. Assistant messages may carry the
/// raw tool-call array; tool messages reference the call they answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Value) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Convert to the chat-completions message format
    pub fn to_wire(&self) -> Value {
        let mut message = json!({
            "role": match self.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            },
            "content": self.content,
        });
        if let Some(tool_calls) = &self.tool_calls {
            message["tool_calls"] = tool_calls.clone();
        }
        if let Some(tool_call_id) = &self.tool_call_id {
            message["tool_call_id"] = json!(tool_call_id);
        }
        message
    }
}

/// The durable per-conversation record. Owned exclusively by the store, which
/// serializes all reads and writes per conversation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub conversation_id: String,
    pub context: ConversationContext,
    pub messages: Vec<ChatMessage>,
    pub current_step: BookingStep,
    pub selection: BookingSelection,
    pub last_activity: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(conversation_id: String, context: ConversationContext) -> Self {
        let current_step = context.current_step.unwrap_or_default();
        Self {
            conversation_id,
            context,
            messages: Vec::new(),
            current_step,
            selection: BookingSelection::default(),
            last_activity: Utc::now(),
        }
    }

    /// Append one message, evicting the oldest beyond the retention cap
    pub fn push_message(&mut self, message: ChatMessage, retention: usize) {
        self.messages.push(message);
        if self.messages.len() > retention {
            let excess = self.messages.len() - retention;
            self.messages.drain(..excess);
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Messages in wire format for a model call
    pub fn wire_messages(&self) -> Vec<Value> {
        self.messages.iter().map(ChatMessage::to_wire).collect()
    }
}
