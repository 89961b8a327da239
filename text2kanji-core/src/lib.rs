//! Text2Kanji core
//!
//! Reads an SMS inbox, groups it into per-sender conversations and translates
//! individual messages through a two-stage on-device pipeline
//! (Tagalog → English → Japanese by default).

pub mod sms;
pub mod timestamp;
pub mod translation;

mod error;

pub use error::{Result, Text2KanjiError, PERMISSION_DENIED_MESSAGE};
pub use sms::{
    assemble, Conversation, ConversationSnapshot, ConversationStore, InboxEvent, InboxWatcher,
    JsonInboxSource, MemorySource, Message, MessageSource, SmsRow,
};
pub use timestamp::{classify, format_timestamp, DateClass};
pub use translation::{
    Connectivity, DownloadConditions, Language, LanguageChain, LanguagePair, NetworkState,
    PhrasebookService, ProbeConnectivity, Stage, StaticConnectivity, TranslationCache,
    TranslationFailure, TranslationService, Translator,
};
