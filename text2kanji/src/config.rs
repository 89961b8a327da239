//! CLI Configuration
//!
//! Configuration management for the Text2Kanji command-line front end.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use text2kanji_core::{DownloadConditions, Language, LanguageChain};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inbox export configuration
    #[serde(default)]
    pub inbox: InboxConfig,

    /// Translation chain configuration
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Model storage configuration
    #[serde(default)]
    pub models: ModelConfig,

    /// Connectivity probe configuration
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Inbox export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxConfig {
    /// JSON export of the SMS inbox (`address`, `body`, `date` rows)
    #[serde(default = "default_inbox_path")]
    pub path: PathBuf,
}

/// Translation chain configuration
///
/// The chain is fixed; messages are not language-detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Language of incoming messages
    #[serde(default = "default_source")]
    pub source: Language,

    /// Pivot language between the two models
    #[serde(default = "default_intermediate")]
    pub intermediate: Language,

    /// Language shown to the user
    #[serde(default = "default_target")]
    pub target: Language,

    /// Only download models over Wi-Fi
    #[serde(default = "default_true")]
    pub require_wifi: bool,
}

/// Model storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory models are downloaded from
    #[serde(default = "default_repository")]
    pub repository: PathBuf,

    /// Local model directory
    #[serde(default = "default_models_dir")]
    pub local_dir: PathBuf,
}

/// Connectivity probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// `host:port` probed to decide whether a network is available
    #[serde(default = "default_probe_host")]
    pub probe_host: String,

    /// Probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Treat the connection as metered (cellular)
    #[serde(default)]
    pub metered: bool,

    /// Skip the probe and report offline
    #[serde(default)]
    pub offline: bool,
}

fn default_true() -> bool {
    true
}

fn default_source() -> Language {
    Language::Tagalog
}

fn default_intermediate() -> Language {
    Language::English
}

fn default_target() -> Language {
    Language::Japanese
}

fn default_probe_host() -> String {
    "1.1.1.1:443".to_string()
}

fn default_probe_timeout() -> u64 {
    3
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("text2kanji")
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("text2kanji")
}

fn default_inbox_path() -> PathBuf {
    data_dir().join("inbox.json")
}

fn default_repository() -> PathBuf {
    data_dir().join("model-repository")
}

fn default_models_dir() -> PathBuf {
    data_dir().join("models")
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            path: default_inbox_path(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            intermediate: default_intermediate(),
            target: default_target(),
            require_wifi: true,
        }
    }
}

impl TranslationConfig {
    pub fn chain(&self) -> LanguageChain {
        LanguageChain::new(self.source, self.intermediate, self.target)
    }

    pub fn conditions(&self) -> DownloadConditions {
        DownloadConditions {
            require_wifi: self.require_wifi,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            local_dir: default_models_dir(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_host: default_probe_host(),
            probe_timeout_secs: default_probe_timeout(),
            metered: false,
            offline: false,
        }
    }
}

impl NetworkConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load configuration from `path` (or the default location), creating
    /// the default file if none exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }
}
