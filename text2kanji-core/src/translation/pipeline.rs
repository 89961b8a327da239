//! Two-stage translation pipeline
//!
//! Stages run strictly in sequence and the first failure ends the run. There
//! is no retry, timeout or cancellation: every request finishes with either the
//! stage-2 output or exactly one [`TranslationFailure`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Connectivity, DownloadConditions, Language, LanguagePair, TranslationService};

/// Message reported when no network is available at invocation time
pub const NO_CONNECTIVITY_MESSAGE: &str = "Connect to the internet to download translation files";

/// Leg of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// source → intermediate
    First,
    /// intermediate → target
    Second,
}

/// Terminal outcome of a failed translation request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationFailure {
    #[error("{}", NO_CONNECTIVITY_MESSAGE)]
    NoConnectivity,

    #[error("Failed to download {pair} model")]
    ModelDownload { stage: Stage, pair: LanguagePair },

    #[error("Failed to translate to {}", .pair.target)]
    Translation { stage: Stage, pair: LanguagePair },
}

impl TranslationFailure {
    /// Stage that failed, `None` for the connectivity check
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::NoConnectivity => None,
            Self::ModelDownload { stage, .. } | Self::Translation { stage, .. } => Some(*stage),
        }
    }

    /// Whether the user should be shown a transient notice rather than an
    /// inline placeholder
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoConnectivity)
    }
}

/// Fixed source → intermediate → target chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageChain {
    pub source: Language,
    pub intermediate: Language,
    pub target: Language,
}

impl LanguageChain {
    pub fn new(source: Language, intermediate: Language, target: Language) -> Self {
        Self {
            source,
            intermediate,
            target,
        }
    }

    pub fn pair(&self, stage: Stage) -> LanguagePair {
        match stage {
            Stage::First => LanguagePair::new(self.source, self.intermediate),
            Stage::Second => LanguagePair::new(self.intermediate, self.target),
        }
    }
}

impl Default for LanguageChain {
    fn default() -> Self {
        Self::new(Language::Tagalog, Language::English, Language::Japanese)
    }
}

/// Drives a [`TranslationService`] through both stages
pub struct Translator {
    service: Arc<dyn TranslationService>,
    connectivity: Arc<dyn Connectivity>,
    chain: LanguageChain,
    conditions: DownloadConditions,
}

impl Translator {
    pub fn new(service: Arc<dyn TranslationService>, connectivity: Arc<dyn Connectivity>) -> Self {
        Self {
            service,
            connectivity,
            chain: LanguageChain::default(),
            conditions: DownloadConditions::default(),
        }
    }

    pub fn with_chain(mut self, chain: LanguageChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_conditions(mut self, conditions: DownloadConditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn chain(&self) -> LanguageChain {
        self.chain
    }

    /// Translate `text` through both stages
    pub async fn translate(&self, text: &str) -> Result<String, TranslationFailure> {
        if !self.connectivity.is_available().await {
            info!("Translation skipped: no network available");
            return Err(TranslationFailure::NoConnectivity);
        }

        let intermediate = self.run_stage(Stage::First, text).await?;
        let translated = self.run_stage(Stage::Second, &intermediate).await?;

        info!(
            "Translated message via {} ({} chars)",
            self.chain.intermediate,
            translated.chars().count()
        );
        Ok(translated)
    }

    /// Callback form of [`translate`](Self::translate)
    ///
    /// Runs on a spawned task; `on_complete` receives the translation or the
    /// failure message, exactly once.
    pub fn translate_with<F>(
        self: &Arc<Self>,
        text: impl Into<String>,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(String) + Send + 'static,
    {
        let translator = Arc::clone(self);
        let text = text.into();

        tokio::spawn(async move {
            let outcome = match translator.translate(&text).await {
                Ok(translated) => translated,
                Err(failure) => failure.to_string(),
            };
            on_complete(outcome);
        })
    }

    async fn run_stage(&self, stage: Stage, text: &str) -> Result<String, TranslationFailure> {
        let pair = self.chain.pair(stage);

        self.service
            .ensure_model(pair, self.conditions)
            .await
            .map_err(|e| {
                warn!("Model {} unavailable: {}", pair.model_id(), e);
                TranslationFailure::ModelDownload { stage, pair }
            })?;

        let output = self.service.translate(pair, text).await.map_err(|e| {
            warn!("Translation with {} failed: {}", pair.model_id(), e);
            TranslationFailure::Translation { stage, pair }
        })?;

        debug!("Stage {:?} ({}) complete", stage, pair);
        Ok(output)
    }
}
