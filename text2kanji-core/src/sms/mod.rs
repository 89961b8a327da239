//! SMS inbox model
//!
//! Raw rows as the message source reports them, and the conversation threads
//! assembled from them.
//!
//! ## Row Format
//!
//! Sources report the same three columns the telephony provider exposes:
//!
//! ```json
//! [
//!     { "address": "+639171234567", "body": "Kumusta ka?", "date": 1690185600000 },
//!     { "address": null, "body": "dropped", "date": 1690185600001 }
//! ]
//! ```
//!
//! Rows without an address never reach a conversation.

pub mod assembler;
pub mod source;
pub mod store;
pub mod watcher;

use serde::{Deserialize, Serialize};

pub use assembler::assemble;
pub use source::{JsonInboxSource, MemorySource, MessageSource};
pub use store::{ConversationSnapshot, ConversationStore, InboxEvent};
pub use watcher::InboxWatcher;

/// One row from the message source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsRow {
    /// Sender or recipient address
    #[serde(default)]
    pub address: Option<String>,

    /// Message body
    #[serde(default)]
    pub body: Option<String>,

    /// Timestamp (milliseconds since epoch)
    pub date: i64,
}

impl SmsRow {
    pub fn new(address: impl Into<String>, body: impl Into<String>, date: i64) -> Self {
        Self {
            address: Some(address.into()),
            body: Some(body.into()),
            date,
        }
    }
}

/// A single message inside a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body
    pub body: String,

    /// Timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

/// All messages observed for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Phone number or address
    pub address: String,

    /// Messages in source order
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Message shown as the conversation preview
    ///
    /// This is the first message in source order; the provider reports the
    /// inbox newest first.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages ordered newest first, ties kept in source order
    pub fn newest_first(&self) -> Vec<&Message> {
        let mut sorted: Vec<&Message> = self.messages.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_deserialization_with_missing_fields() {
        let json = r#"[
            {"address": "+639171234567", "body": "Kumusta", "date": 1000},
            {"body": "no sender", "date": 2000},
            {"address": "+639171234567", "date": 3000}
        ]"#;

        let rows: Vec<SmsRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].address.as_deref(), Some("+639171234567"));
        assert!(rows[1].address.is_none());
        assert!(rows[2].body.is_none());
    }

    #[test]
    fn test_memory_source_feeds_assembler() {
        let source = MemorySource::new(vec![
            SmsRow::new("111", "a", 2),
            SmsRow::new("222", "b", 1),
        ]);
        let rows = tokio_test::block_on(source.query()).unwrap();

        let conversations = assemble(rows);
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].latest().unwrap().body, "a");
    }

    #[test]
    fn test_newest_first() {
        let conversation = Conversation {
            address: "123".to_string(),
            messages: vec![
                Message { body: "b".to_string(), timestamp: 2 },
                Message { body: "c".to_string(), timestamp: 3 },
                Message { body: "a".to_string(), timestamp: 1 },
            ],
        };

        let bodies: Vec<&str> = conversation
            .newest_first()
            .iter()
            .map(|m| m.body.as_str())
            .collect();
        assert_eq!(bodies, vec!["c", "b", "a"]);
        assert_eq!(conversation.latest().unwrap().body, "b");
    }
}
