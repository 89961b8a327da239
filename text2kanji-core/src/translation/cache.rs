//! Completed translations, keyed by message body

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

/// Map of message body → translation (or failure placeholder)
///
/// Every update publishes a fresh map; snapshots taken earlier never change.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: RwLock<Arc<HashMap<String, String>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome for `body`, replacing any earlier one
    pub fn record(&self, body: impl Into<String>, translation: impl Into<String>) {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());

        let mut next = HashMap::clone(&guard);
        next.insert(body.into(), translation.into());
        *guard = Arc::new(next);

        debug!("Recorded translation for message ({} cached)", guard.len());
    }

    pub fn get(&self, body: &str) -> Option<String> {
        self.snapshot().get(body).cloned()
    }

    pub fn snapshot(&self) -> Arc<HashMap<String, String>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Clipboard text for `body`, with the translation appended when known
    pub fn copy_text(&self, body: &str) -> String {
        match self.get(body) {
            Some(translation) => format!("{}\nTranslated: {}", body, translation),
            None => body.to_string(),
        }
    }
}
