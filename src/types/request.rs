use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::booking::BookingStep;
use crate::core::conversation::{ChatMessage, Role};
use crate::error::{AgentError, Result};

/// Who is taking the stopover
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub loyalty_tier: Option<String>,
}

/// The original itinerary the stopover attaches to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    /// Original booking reference (PNR)
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub outbound_date: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
}

/// Caller-supplied conversation context accompanying each turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub booking: Option<BookingDetails>,
    #[serde(default)]
    pub entry_point: Option<String>,
    #[serde(default)]
    pub current_step: Option<BookingStep>,
}

impl ConversationContext {
    /// Stable key for the state store: an explicit conversation id wins, then
    /// the booking reference, then a fresh id for anonymous sessions.
    pub fn conversation_key(&self) -> String {
        if let Some(id) = &self.conversation_id {
            if !id.is_empty() {
                return id.clone();
            }
        }
        if let Some(reference) = self.booking.as_ref().and_then(|b| b.reference.as_ref()) {
            if !reference.is_empty() {
                return format!("pnr-{reference}");
            }
        }
        uuid::Uuid::new_v4().to_string()
    }
}

/// Inbound chat turn. `messages` stays untyped at the boundary so a malformed
/// list can be rejected with a client error instead of a deserialization 500.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub conversation_context: Option<ConversationContext>,
}

impl ChatRequest {
    /// Validate the message list shape before any model work happens.
    pub fn validated_messages(&self) -> Result<Vec<ChatMessage>> {
        let invalid = || AgentError::InvalidRequest("Invalid messages format".to_string());

        let list = self
            .messages
            .as_ref()
            .and_then(Value::as_array)
            .ok_or_else(invalid)?;

        let mut messages = Vec::with_capacity(list.len());
        for entry in list {
            let role = entry.get("role").and_then(Value::as_str).ok_or_else(invalid)?;
            let content = entry
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(invalid)?;

            let role = match role {
                "user" => Role::User,
                "assistant" => Role::Assistant,
                "system" => Role::System,
                _ => return Err(invalid()),
            };

            messages.push(ChatMessage {
                role,
                content: content.to_string(),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        if messages.is_empty() {
            return Err(invalid());
        }

        Ok(messages)
    }
}
