//! Conversation snapshot store
//!
//! Holds the conversations from the most recent successful load. A reload
//! builds a complete new snapshot off to the side and publishes it with a
//! single replace, so a reader sees either the old snapshot or the new one.
//! Subscribers are woken on every publish.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{assemble, Conversation, Message, MessageSource};
use crate::Result;

/// Notifications that should cause the inbox to be read again
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxEvent {
    /// A new SMS arrived from `sender`
    MessageReceived { sender: String },
    /// The underlying inbox changed without a known sender
    InboxChanged,
}

/// Conversations from one load cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSnapshot {
    conversations: Vec<Conversation>,
    loaded_at: Option<DateTime<Utc>>,
}

impl ConversationSnapshot {
    pub fn new(conversations: Vec<Conversation>, loaded_at: DateTime<Utc>) -> Self {
        Self {
            conversations,
            loaded_at: Some(loaded_at),
        }
    }

    /// Snapshot before anything has been loaded
    pub fn empty() -> Self {
        Self {
            conversations: Vec::new(),
            loaded_at: None,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// `None` until the first successful load
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn find(&self, address: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.address == address)
    }

    /// Messages for `address`, empty when the address is unknown
    pub fn messages_for(&self, address: &str) -> &[Message] {
        self.find(address)
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}

impl Default for ConversationSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Owns the current snapshot and the source it is built from
pub struct ConversationStore {
    source: Arc<dyn MessageSource>,
    snapshot: watch::Sender<Arc<ConversationSnapshot>>,
}

impl ConversationStore {
    pub fn new(source: Arc<dyn MessageSource>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(ConversationSnapshot::empty()));
        Self { source, snapshot }
    }

    /// Current snapshot
    ///
    /// The returned `Arc` stays valid and unchanged across later reloads.
    pub fn snapshot(&self) -> Arc<ConversationSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes snapshots published after this call
    ///
    /// The current snapshot counts as already seen.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ConversationSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Read the source again and replace the snapshot
    ///
    /// On error the previous snapshot is kept.
    pub async fn reload(&self) -> Result<Arc<ConversationSnapshot>> {
        let rows = self.source.query().await?;
        let row_count = rows.len();

        let fresh = Arc::new(ConversationSnapshot::new(assemble(rows), Utc::now()));
        self.snapshot.send_replace(fresh.clone());

        info!(
            "Loaded {} conversations from {} rows",
            fresh.conversations().len(),
            row_count
        );
        Ok(fresh)
    }

    /// Reload once per incoming event until the sender side closes
    ///
    /// Failed reloads are logged and the loop keeps going.
    pub async fn run(&self, mut events: mpsc::Receiver<InboxEvent>) {
        while let Some(event) = events.recv().await {
            match &event {
                InboxEvent::MessageReceived { sender } => {
                    debug!("New message from {}, reloading inbox", sender);
                }
                InboxEvent::InboxChanged => debug!("Inbox changed, reloading"),
            }

            if let Err(e) = self.reload().await {
                warn!("Failed to reload inbox after {:?}: {}", event, e);
            }
        }

        debug!("Inbox event channel closed");
    }
}
