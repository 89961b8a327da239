//! On-device message translation
//!
//! A message is translated in two stages through an intermediate language:
//! source → intermediate, then intermediate → target. Each stage makes sure its
//! model is present locally before translating.
//!
//! ## Collaborators
//!
//! - [`TranslationService`]: model download and translate calls, per language pair
//! - [`Connectivity`]: whether a network is currently available
//!
//! ## Failure Strings
//!
//! With the default Tagalog → English → Japanese chain:
//!
//! | Failure                 | Message                                                  |
//! |-------------------------|----------------------------------------------------------|
//! | no network              | `Connect to the internet to download translation files`  |
//! | stage 1 model download  | `Failed to download Tagalog-to-English model`            |
//! | stage 1 translation     | `Failed to translate to English`                         |
//! | stage 2 model download  | `Failed to download English-to-Japanese model`           |
//! | stage 2 translation     | `Failed to translate to Japanese`                        |

pub mod cache;
pub mod connectivity;
pub mod phrasebook;
pub mod pipeline;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use cache::TranslationCache;
pub use connectivity::{Connectivity, NetworkState, ProbeConnectivity, StaticConnectivity};
pub use phrasebook::{Phrasebook, PhrasebookService};
pub use pipeline::{LanguageChain, Stage, TranslationFailure, Translator};

/// Languages the translation models cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Tagalog,
    English,
    Japanese,
}

impl Language {
    /// BCP-47 code, also used in model file names
    pub fn code(&self) -> &'static str {
        match self {
            Self::Tagalog => "tl",
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Tagalog => "Tagalog",
            Self::English => "English",
            Self::Japanese => "Japanese",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "tl" | "fil" => Some(Self::Tagalog),
            "en" => Some(Self::English),
            "ja" => Some(Self::Japanese),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Direction of one translation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }

    /// Model identifier, e.g. `tl-en`
    pub fn model_id(&self) -> String {
        format!("{}-{}", self.source.code(), self.target.code())
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-to-{}", self.source, self.target)
    }
}

/// Network requirements for downloading a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConditions {
    /// Only download over Wi-Fi
    pub require_wifi: bool,
}

impl DownloadConditions {
    pub fn wifi_only() -> Self {
        Self { require_wifi: true }
    }

    pub fn any_network() -> Self {
        Self {
            require_wifi: false,
        }
    }

    /// Whether a download may start in `state`
    pub fn permits(&self, state: NetworkState) -> bool {
        match state {
            NetworkState::Offline => false,
            NetworkState::Cellular => !self.require_wifi,
            NetworkState::Wifi => true,
        }
    }
}

impl Default for DownloadConditions {
    fn default() -> Self {
        Self::wifi_only()
    }
}

/// External translation model service
///
/// Both calls are independently failable and never retried by callers.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Make the model for `pair` available locally, downloading it if needed
    async fn ensure_model(&self, pair: LanguagePair, conditions: DownloadConditions) -> Result<()>;

    /// Translate `text` with the model for `pair`
    async fn translate(&self, pair: LanguagePair, text: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Tagalog.code(), "tl");
        assert_eq!(Language::from_code("fil"), Some(Language::Tagalog));
        assert_eq!(Language::from_code("ja"), Some(Language::Japanese));
        assert_eq!(Language::from_code("xx"), None);
    }

    #[test]
    fn test_pair_display_and_model_id() {
        let pair = LanguagePair::new(Language::English, Language::Japanese);
        assert_eq!(pair.to_string(), "English-to-Japanese");
        assert_eq!(pair.model_id(), "en-ja");
    }

    #[test]
    fn test_download_conditions() {
        let wifi = DownloadConditions::wifi_only();
        assert!(wifi.permits(NetworkState::Wifi));
        assert!(!wifi.permits(NetworkState::Cellular));
        assert!(!wifi.permits(NetworkState::Offline));

        let any = DownloadConditions::any_network();
        assert!(any.permits(NetworkState::Cellular));
        assert!(!any.permits(NetworkState::Offline));

        assert_eq!(DownloadConditions::default(), wifi);
    }

    #[test]
    fn test_language_serde() {
        let json = serde_json::to_string(&Language::Japanese).unwrap();
        assert_eq!(json, "\"japanese\"");
        let parsed: Language = serde_json::from_str("\"tagalog\"").unwrap();
        assert_eq!(parsed, Language::Tagalog);
    }
}
