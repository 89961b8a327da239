//! Phrase-table translation models
//!
//! Each model is a JSON file named after its language pair (`tl-en.json`)
//! holding a phrase table:
//!
//! ```json
//! {
//!     "phrases": { "kumusta": "hello", "salamat": "thank you" },
//!     "separator": " "
//! }
//! ```
//!
//! Models are downloaded on demand from a repository directory into the local
//! model directory, then kept in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{Connectivity, DownloadConditions, LanguagePair, TranslationService};
use crate::{Result, Text2KanjiError};

fn default_separator() -> String {
    " ".to_string()
}

fn lowercase_keys<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let phrases = HashMap::<String, String>::deserialize(deserializer)?;
    Ok(phrases
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect())
}

/// One loaded translation model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Phrasebook {
    /// Phrase → translation; keys are stored lowercased
    #[serde(deserialize_with = "lowercase_keys")]
    pub phrases: HashMap<String, String>,

    /// Joins translated words in the output
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Phrasebook {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Translate a whole-phrase match, otherwise word by word
    ///
    /// Unknown words pass through unchanged; trailing punctuation stays
    /// attached to the translated word.
    pub fn translate(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Text2KanjiError::Translation("empty text".to_string()));
        }

        if let Some(phrase) = self.phrases.get(&trimmed.to_lowercase()) {
            return Ok(phrase.clone());
        }

        let words: Vec<String> = trimmed
            .split_whitespace()
            .map(|word| {
                let core = word.trim_end_matches(|c: char| c.is_ascii_punctuation());
                let tail = &word[core.len()..];
                match self.phrases.get(&core.to_lowercase()) {
                    Some(translated) => format!("{}{}", translated, tail),
                    None => word.to_string(),
                }
            })
            .collect();

        Ok(words.join(&self.separator))
    }
}

/// [`TranslationService`] over phrase-table model files
pub struct PhrasebookService {
    repository: PathBuf,
    models_dir: PathBuf,
    connectivity: Arc<dyn Connectivity>,
    loaded: RwLock<HashMap<LanguagePair, Arc<Phrasebook>>>,
    /// Serializes check-download-load so concurrent requests share one copy
    install: Mutex<()>,
}

impl PhrasebookService {
    /// * `repository` - where models are downloaded from
    /// * `models_dir` - local model storage
    pub fn new(
        repository: impl Into<PathBuf>,
        models_dir: impl Into<PathBuf>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            repository: repository.into(),
            models_dir: models_dir.into(),
            connectivity,
            loaded: RwLock::new(HashMap::new()),
            install: Mutex::new(()),
        }
    }

    pub fn model_path(&self, pair: LanguagePair) -> PathBuf {
        model_file(&self.models_dir, pair)
    }

    /// Models currently held in memory
    pub async fn loaded_models(&self) -> Vec<LanguagePair> {
        self.loaded.read().await.keys().copied().collect()
    }

    /// Read the installed model, discarding a file that does not parse
    async fn load_local(&self, pair: LanguagePair) -> Result<Option<Phrasebook>> {
        let local = self.model_path(pair);
        if !tokio::fs::try_exists(&local).await.unwrap_or(false) {
            debug!("Model {} not present locally", pair.model_id());
            return Ok(None);
        }

        let data = tokio::fs::read(&local).await?;
        match Phrasebook::from_json(&data) {
            Ok(phrasebook) => Ok(Some(phrasebook)),
            Err(e) => {
                warn!("Discarding unreadable model {}: {}", local.display(), e);
                tokio::fs::remove_file(&local).await?;
                Ok(None)
            }
        }
    }

    /// Fetch a model from the repository
    ///
    /// The copy is parsed, written to a staging file and renamed into place;
    /// the models directory only ever holds complete models.
    async fn download(
        &self,
        pair: LanguagePair,
        conditions: DownloadConditions,
    ) -> Result<Phrasebook> {
        let state = self.connectivity.network_state().await;
        if !conditions.permits(state) {
            return Err(Text2KanjiError::Model(format!(
                "download of {} not permitted on {:?} network",
                pair.model_id(),
                state
            )));
        }

        let remote = model_file(&self.repository, pair);
        if !tokio::fs::try_exists(&remote).await.unwrap_or(false) {
            return Err(Text2KanjiError::Model(format!(
                "{} not found in repository {}",
                pair.model_id(),
                self.repository.display()
            )));
        }

        let data = tokio::fs::read(&remote).await?;
        let phrasebook = Phrasebook::from_json(&data)
            .map_err(|e| Text2KanjiError::Model(format!("{}: {}", pair.model_id(), e)))?;

        tokio::fs::create_dir_all(&self.models_dir).await?;
        let staging = self
            .models_dir
            .join(format!(".{}.json.part", pair.model_id()));
        tokio::fs::write(&staging, &data).await?;
        tokio::fs::rename(&staging, self.model_path(pair)).await?;

        info!("Downloaded model {} ({} bytes)", pair.model_id(), data.len());
        Ok(phrasebook)
    }
}

fn model_file(dir: &Path, pair: LanguagePair) -> PathBuf {
    dir.join(format!("{}.json", pair.model_id()))
}

#[async_trait]
impl TranslationService for PhrasebookService {
    async fn ensure_model(&self, pair: LanguagePair, conditions: DownloadConditions) -> Result<()> {
        if self.loaded.read().await.contains_key(&pair) {
            return Ok(());
        }

        let _install = self.install.lock().await;
        if self.loaded.read().await.contains_key(&pair) {
            return Ok(());
        }

        let phrasebook = match self.load_local(pair).await? {
            Some(phrasebook) => phrasebook,
            None => self.download(pair, conditions).await?,
        };

        debug!(
            "Loaded model {} with {} phrases",
            pair.model_id(),
            phrasebook.phrases.len()
        );
        self.loaded.write().await.insert(pair, Arc::new(phrasebook));
        Ok(())
    }

    async fn translate(&self, pair: LanguagePair, text: &str) -> Result<String> {
        let phrasebook = self
            .loaded
            .read()
            .await
            .get(&pair)
            .cloned()
            .ok_or_else(|| Text2KanjiError::Model(format!("{} not loaded", pair.model_id())))?;

        phrasebook.translate(text)
    }
}
