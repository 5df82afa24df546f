//! Conversation memory keyed by thread id.
//!
//! A [`MemoryStore`] maps an opaque thread id to an append-only message
//! history. The agent loop reads a thread before a run and appends whatever
//! the run produced afterwards; it never rewrites earlier messages.

pub mod file;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::BriefError;
use crate::types::ModelMessage;

pub use file::FileMemoryStore;

/// Keyed, append-only conversation history.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Messages recorded for `thread_id`, oldest first. Unknown ids are empty.
    async fn get_history(&self, thread_id: &str) -> Result<Vec<ModelMessage>, BriefError>;

    /// Append messages to the end of `thread_id`'s history.
    async fn append(&self, thread_id: &str, messages: &[ModelMessage]) -> Result<(), BriefError>;
}

/// Process-lifetime store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    threads: RwLock<HashMap<String, Vec<ModelMessage>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thread ids with at least one stored message.
    pub fn thread_ids(&self) -> Vec<String> {
        let threads = self.threads.read().unwrap_or_else(|p| p.into_inner());
        threads.keys().cloned().collect()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn get_history(&self, thread_id: &str) -> Result<Vec<ModelMessage>, BriefError> {
        let threads = self.threads.read().unwrap_or_else(|p| p.into_inner());
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }

    async fn append(&self, thread_id: &str, messages: &[ModelMessage]) -> Result<(), BriefError> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut threads = self.threads.write().unwrap_or_else(|p| p.into_inner());
        threads
            .entry(thread_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }
}
