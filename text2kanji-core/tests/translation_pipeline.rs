//! Translation Pipeline Tests
//!
//! End-to-end runs of the two-stage translator:
//! - against phrase-table models downloaded from a repository directory
//! - against a recording service for the short-circuit paths
//! - concurrent requests sharing one result cache

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use text2kanji_core::translation::pipeline::NO_CONNECTIVITY_MESSAGE;
use text2kanji_core::{
    DownloadConditions, LanguagePair, NetworkState, PhrasebookService, Result, StaticConnectivity,
    Text2KanjiError, TranslationCache, TranslationFailure, TranslationService, Translator,
};

/// Records every call; fails downloads for the listed model ids
struct RecordingService {
    failing_downloads: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl RecordingService {
    fn new(failing_downloads: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            failing_downloads,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationService for RecordingService {
    async fn ensure_model(&self, pair: LanguagePair, _: DownloadConditions) -> Result<()> {
        let id = pair.model_id();
        self.calls.lock().unwrap().push(format!("ensure {}", id));
        if self.failing_downloads.contains(&id.as_str()) {
            return Err(Text2KanjiError::Model(id));
        }
        Ok(())
    }

    async fn translate(&self, pair: LanguagePair, text: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("translate {}", pair.model_id()));
        match (pair.model_id().as_str(), text) {
            ("tl-en", "Hi") => Ok("Hello".to_string()),
            ("en-ja", "Hello") => Ok("こんにちは".to_string()),
            _ => Err(Text2KanjiError::Translation(text.to_string())),
        }
    }
}

fn write_models(dir: &Path) {
    std::fs::write(
        dir.join("tl-en.json"),
        r#"{"phrases": {"salamat": "thank you", "kumusta ka?": "how are you?", "magandang umaga": "good morning"}}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("en-ja.json"),
        r#"{"phrases": {"thank you": "ありがとう", "how are you?": "お元気ですか", "good morning": "おはよう"}, "separator": ""}"#,
    )
    .unwrap();
}

fn phrasebook_translator(repo: &TempDir, local: &TempDir, state: NetworkState) -> Translator {
    let connectivity = Arc::new(StaticConnectivity(state));
    let service = Arc::new(PhrasebookService::new(
        repo.path(),
        local.path(),
        connectivity.clone(),
    ));
    Translator::new(service, connectivity)
}

#[tokio::test]
async fn test_tagalog_to_japanese_with_phrasebooks() {
    let repo = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    write_models(repo.path());

    let translator = phrasebook_translator(&repo, &local, NetworkState::Wifi);

    assert_eq!(translator.translate("Salamat").await.unwrap(), "ありがとう");
    assert_eq!(
        translator.translate("Kumusta ka?").await.unwrap(),
        "お元気ですか"
    );
    assert!(local.path().join("tl-en.json").exists());
    assert!(local.path().join("en-ja.json").exists());
}

#[tokio::test]
async fn test_wifi_only_models_on_cellular() {
    let repo = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    write_models(repo.path());

    let translator = phrasebook_translator(&repo, &local, NetworkState::Cellular);
    let failure = translator.translate("Salamat").await.unwrap_err();
    assert_eq!(
        failure.to_string(),
        "Failed to download Tagalog-to-English model"
    );

    let translator = phrasebook_translator(&repo, &local, NetworkState::Cellular)
        .with_conditions(DownloadConditions::any_network());
    assert_eq!(translator.translate("Salamat").await.unwrap(), "ありがとう");
}

#[tokio::test]
async fn test_missing_second_model() {
    let repo = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    write_models(repo.path());
    std::fs::remove_file(repo.path().join("en-ja.json")).unwrap();

    let translator = phrasebook_translator(&repo, &local, NetworkState::Wifi);
    let failure = translator.translate("Salamat").await.unwrap_err();
    assert_eq!(
        failure.to_string(),
        "Failed to download English-to-Japanese model"
    );
}

#[tokio::test]
async fn test_offline_completion_without_service_calls() {
    let service = RecordingService::new(vec![]);
    let translator = Arc::new(Translator::new(
        service.clone(),
        Arc::new(StaticConnectivity(NetworkState::Offline)),
    ));

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    translator
        .translate_with("Hi", move |text| sink.lock().unwrap().push(text))
        .await
        .unwrap();

    assert_eq!(*received.lock().unwrap(), vec![NO_CONNECTIVITY_MESSAGE]);
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_stage_one_download_failure_skips_stage_two() {
    let service = RecordingService::new(vec!["tl-en"]);
    let translator = Arc::new(Translator::new(
        service.clone(),
        Arc::new(StaticConnectivity(NetworkState::Wifi)),
    ));

    let (tx, rx) = tokio::sync::oneshot::channel();
    translator.translate_with("Hi", move |text| {
        let _ = tx.send(text);
    });

    assert_eq!(rx.await.unwrap(), "Failed to download Tagalog-to-English model");
    assert_eq!(service.calls(), vec!["ensure tl-en"]);
}

#[tokio::test]
async fn test_hi_becomes_konnichiwa_exactly_once() {
    let service = RecordingService::new(vec![]);
    let translator = Arc::new(Translator::new(
        service,
        Arc::new(StaticConnectivity(NetworkState::Wifi)),
    ));

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    translator
        .translate_with("Hi", move |text| sink.lock().unwrap().push(text))
        .await
        .unwrap();

    assert_eq!(*received.lock().unwrap(), vec!["こんにちは".to_string()]);
}

#[tokio::test]
async fn test_concurrent_requests_fill_shared_cache() {
    let repo = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    write_models(repo.path());

    let translator = Arc::new(phrasebook_translator(&repo, &local, NetworkState::Wifi));
    let cache = Arc::new(TranslationCache::new());

    let bodies = ["Salamat", "Kumusta ka?", "Magandang umaga", "walang kapareha"];
    let handles: Vec<_> = bodies
        .iter()
        .map(|body| {
            let cache = cache.clone();
            let key = body.to_string();
            translator.translate_with(*body, move |text| cache.record(key, text))
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(cache.len(), bodies.len());
    assert_eq!(cache.get("Salamat").as_deref(), Some("ありがとう"));
    assert_eq!(cache.get("Magandang umaga").as_deref(), Some("おはよう"));
    assert_eq!(
        cache.copy_text("Kumusta ka?"),
        "Kumusta ka?\nTranslated: お元気ですか"
    );
}

#[test]
fn test_failure_is_transient_only_without_network() {
    assert!(TranslationFailure::NoConnectivity.is_transient());
}
