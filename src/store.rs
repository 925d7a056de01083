//! Per-conversation state store. One logical writer per conversation id:
//! every record sits behind its own async mutex, so concurrent turns for the
//! same id serialize at this boundary while different ids proceed in
//! parallel. Locks are held only for the local merge/append, never across a
//! model call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::booking::{BookingStep, SelectionDelta};
use crate::core::conversation::{ChatMessage, ConversationRecord};
use crate::error::{AgentError, Result};
use crate::types::request::ConversationContext;

/// Field-wise merge applied by [`ConversationStore::update`]; the record is
/// never replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub delta: Option<SelectionDelta>,
    pub step: Option<BookingStep>,
}

pub struct ConversationStore {
    entries: Mutex<HashMap<String, Arc<Mutex<ConversationRecord>>>>,
    retention: usize,
    ttl: chrono::Duration,
}

impl ConversationStore {
    pub fn new(retention: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retention,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(24)),
        }
    }

    async fn entry(&self, conversation_id: &str) -> Result<Arc<Mutex<ConversationRecord>>> {
        let entries = self.entries.lock().await;
        entries
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| AgentError::Unknown(format!("Unknown conversation: {conversation_id}")))
    }

    /// Create the record if absent, else return the existing one. Idempotent;
    /// also the opportunistic hook for TTL cleanup.
    pub async fn init(&self, context: &ConversationContext) -> ConversationRecord {
        self.cleanup().await;

        let conversation_id = context.conversation_key();
        let entry = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(conversation_id.clone())
                .or_insert_with(|| {
                    info!(conversation_id = %conversation_id, "conversation created");
                    Arc::new(Mutex::new(ConversationRecord::new(
                        conversation_id.clone(),
                        context.clone(),
                    )))
                })
                .clone()
        };

        let mut record = entry.lock().await;
        record.touch();
        record.clone()
    }

    pub async fn snapshot(&self, conversation_id: &str) -> Result<ConversationRecord> {
        let entry = self.entry(conversation_id).await?;
        let record = entry.lock().await;
        Ok(record.clone())
    }

    /// Merge selection/step fields into the record
    pub async fn update(&self, conversation_id: &str, update: StateUpdate) -> Result<()> {
        let entry = self.entry(conversation_id).await?;
        let mut record = entry.lock().await;
        if let Some(delta) = &update.delta {
            delta.apply(&mut record.selection);
        }
        if let Some(step) = update.step {
            debug!(conversation_id = %conversation_id, step = %step, "step advanced");
            record.current_step = step;
        }
        record.touch();
        Ok(())
    }

    /// Append one message, trimming history beyond the retention cap
    pub async fn append_message(&self, conversation_id: &str, message: ChatMessage) -> Result<()> {
        let entry = self.entry(conversation_id).await?;
        let mut record = entry.lock().await;
        record.push_message(message, self.retention);
        Ok(())
    }

    /// Evict records idle past the TTL. Returns the number evicted.
    pub async fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;
        let mut stale = Vec::new();

        for (id, entry) in entries.iter() {
            if let Ok(record) = entry.try_lock() {
                if now - record.last_activity > self.ttl {
                    stale.push(id.clone());
                }
            }
        }

        for id in &stale {
            entries.remove(id);
            info!(conversation_id = %id, "conversation expired");
        }

        stale.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::booking::BookingStep;
    use crate::types::request::ConversationContext;

    fn context(id: &str) -> ConversationContext {
        ConversationContext {
            conversation_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let store = ConversationStore::new(50, Duration::from_secs(3600));
        let first = store.init(&context("c1")).await;
        store
            .append_message("c1", ChatMessage::user("hello"))
            .await
            .unwrap();
        let second = store.init(&context("c1")).await;

        assert_eq!(first.conversation_id, second.conversation_id);
        assert_eq!(second.messages.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_merges_without_replacing() {
        let store = ConversationStore::new(50, Duration::from_secs(3600));
        store.init(&context("c1")).await;
        store
            .append_message("c1", ChatMessage::user("hi"))
            .await
            .unwrap();

        store
            .update(
                "c1",
                StateUpdate {
                    delta: Some(SelectionDelta {
                        category: Some(("premium".into(), "Premium".into())),
                        ..Default::default()
                    }),
                    step: Some(BookingStep::CategorySelected),
                },
            )
            .await
            .unwrap();

        let record = store.snapshot("c1").await.unwrap();
        assert_eq!(record.selection.category_id.as_deref(), Some("premium"));
        assert_eq!(record.current_step, BookingStep::CategorySelected);
        // The concurrent message append survived the merge.
        assert_eq!(record.messages.len(), 1);
    }

    #[tokio::test]
    async fn append_trims_beyond_retention() {
        let store = ConversationStore::new(3, Duration::from_secs(3600));
        store.init(&context("c1")).await;
        for i in 0..5 {
            store
                .append_message("c1", ChatMessage::user(format!("m{i}")))
                .await
                .unwrap();
        }
        let record = store.snapshot("c1").await.unwrap();
        assert_eq!(record.messages.len(), 3);
        assert_eq!(record.messages[0].content, "m2");
    }

    #[tokio::test]
    async fn cleanup_evicts_only_expired_records() {
        let store = ConversationStore::new(50, Duration::from_secs(3600));
        store.init(&context("fresh")).await;
        store.init(&context("stale")).await;

        {
            let entry = store.entry("stale").await.unwrap();
            let mut record = entry.lock().await;
            record.last_activity = Utc::now() - chrono::Duration::hours(2);
        }

        assert_eq!(store.cleanup().await, 1);
        assert!(store.snapshot("fresh").await.is_ok());
        assert!(store.snapshot("stale").await.is_err());
    }

    #[tokio::test]
    async fn writes_for_the_same_id_serialize() {
        let store = Arc::new(ConversationStore::new(200, Duration::from_secs(3600)));
        store.init(&context("c1")).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append_message("c1", ChatMessage::user(format!("m{i}")))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = store.snapshot("c1").await.unwrap();
        assert_eq!(record.messages.len(), 20);
    }
}
