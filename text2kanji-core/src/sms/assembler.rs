//! Conversation assembly
//!
//! Groups raw rows by address. Order inside each conversation is the order the
//! source reported; conversations appear in first-seen order of their address.

use std::collections::HashMap;

use tracing::debug;

use super::{Conversation, Message, SmsRow};

/// Build conversations from one batch of rows
///
/// Rows with an absent or empty address are skipped. A missing body is kept as
/// an empty message.
pub fn assemble<I>(rows: I) -> Vec<Conversation>
where
    I: IntoIterator<Item = SmsRow>,
{
    let mut conversations: Vec<Conversation> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let address = match row.address {
            Some(address) if !address.is_empty() => address,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let message = Message {
            body: row.body.unwrap_or_default(),
            timestamp: row.date,
        };

        match index.get(&address) {
            Some(&slot) => conversations[slot].messages.push(message),
            None => {
                index.insert(address.clone(), conversations.len());
                conversations.push(Conversation {
                    address,
                    messages: vec![message],
                });
            }
        }
    }

    debug!(
        "Assembled {} conversations ({} rows without address skipped)",
        conversations.len(),
        skipped
    );

    conversations
}
