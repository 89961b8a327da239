//! Inbox file watcher
//!
//! Turns filesystem changes to the inbox export into [`InboxEvent`]s for
//! [`ConversationStore::run`](super::ConversationStore::run).

use std::path::{Path, PathBuf};

use notify::event::EventKind;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::InboxEvent;
use crate::{Result, Text2KanjiError};

/// Watches one inbox export file
///
/// Dropping the watcher stops event delivery.
pub struct InboxWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl InboxWatcher {
    /// Start watching `path` and forward changes to `events`
    ///
    /// The parent directory is watched so that editors replacing the file
    /// atomically are still observed.
    pub fn start(path: impl Into<PathBuf>, events: mpsc::Sender<InboxEvent>) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| {
                Text2KanjiError::Configuration(format!(
                    "inbox path has no file name: {}",
                    path.display()
                ))
            })?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if !is_content_change(&event.kind) {
                        return;
                    }
                    let touches_inbox = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if touches_inbox {
                        debug!("Inbox file event: {:?}", event.kind);
                        if events.blocking_send(InboxEvent::InboxChanged).is_err() {
                            debug!("Inbox event receiver dropped");
                        }
                    }
                }
                Err(e) => warn!("Watch error: {:?}", e),
            },
            Config::default(),
        )
        .map_err(|e| Text2KanjiError::Watch(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| Text2KanjiError::Watch(format!("{}: {}", dir.display(), e)))?;

        info!("Watching inbox {}", path.display());

        Ok(Self {
            path,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}
