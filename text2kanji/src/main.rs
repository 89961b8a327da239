//! Text2Kanji command-line front end

mod config;
mod diagnostics;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use text2kanji_core::timestamp::{format_timestamp, group_by_day, message_time};
use text2kanji_core::{
    Connectivity, ConversationSnapshot, ConversationStore, InboxWatcher, JsonInboxSource,
    NetworkState, PhrasebookService, ProbeConnectivity, StaticConnectivity, TranslationCache,
    Translator,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use config::Config;
use diagnostics::{Cli, Command};

/// Preview length in the conversation list
const PREVIEW_CHARS: usize = 60;

/// Wired-up core services for one invocation
struct App {
    config: Config,
    store: Arc<ConversationStore>,
    translator: Arc<Translator>,
}

impl App {
    fn new(config: Config) -> Self {
        let source = Arc::new(JsonInboxSource::new(config.inbox.path.clone()));
        let store = Arc::new(ConversationStore::new(source));

        let connectivity: Arc<dyn Connectivity> = if config.network.offline {
            Arc::new(StaticConnectivity(NetworkState::Offline))
        } else {
            Arc::new(ProbeConnectivity::new(
                config.network.probe_host.clone(),
                config.network.probe_timeout(),
                config.network.metered,
            ))
        };

        let service = Arc::new(PhrasebookService::new(
            config.models.repository.clone(),
            config.models.local_dir.clone(),
            connectivity.clone(),
        ));
        let translator = Arc::new(
            Translator::new(service, connectivity)
                .with_chain(config.translation.chain())
                .with_conditions(config.translation.conditions()),
        );

        Self {
            config,
            store,
            translator,
        }
    }

    async fn load(&self) -> Result<Arc<ConversationSnapshot>> {
        match self.store.reload().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!("Inbox load failed: {}", e);
                bail!(e.user_message())
            }
        }
    }

    async fn list(&self) -> Result<()> {
        let snapshot = self.load().await?;
        print_conversations(&snapshot);
        Ok(())
    }

    async fn show(&self, address: &str) -> Result<()> {
        let snapshot = self.load().await?;
        let messages = snapshot.messages_for(address);

        println!("{}", address);
        if messages.is_empty() {
            println!("  (no messages)");
            return Ok(());
        }

        for (day, members) in group_by_day(messages, &Local, |m| m.timestamp) {
            println!();
            println!("  {}", day);
            for message in members {
                println!(
                    "    [{}] {}",
                    message_time(message.timestamp, &Local),
                    message.body
                );
            }
        }
        Ok(())
    }

    async fn translate(&self, text: &str) -> Result<()> {
        match self.translator.translate(text).await {
            Ok(translated) => println!("{}", translated),
            Err(failure) if failure.is_transient() => eprintln!("{}", failure),
            Err(failure) => println!("{}", failure),
        }
        Ok(())
    }

    async fn translate_thread(&self, address: &str) -> Result<()> {
        let snapshot = self.load().await?;
        let messages = snapshot.messages_for(address);
        if messages.is_empty() {
            bail!("No conversation with {}", address);
        }

        let cache = Arc::new(TranslationCache::new());
        let handles: Vec<_> = messages
            .iter()
            .map(|message| {
                let cache = cache.clone();
                let body = message.body.clone();
                self.translator
                    .translate_with(message.body.clone(), move |text| cache.record(body, text))
            })
            .collect();

        for handle in futures::future::join_all(handles).await {
            handle.context("Translation task panicked")?;
        }

        info!("Translated {} messages for {}", cache.len(), address);
        for message in messages {
            println!("{}", cache.copy_text(&message.body));
            println!();
        }
        Ok(())
    }

    async fn watch(&self) -> Result<()> {
        let (tx, rx) = mpsc::channel(32);
        let _watcher = InboxWatcher::start(self.config.inbox.path.clone(), tx)
            .context("Failed to watch inbox")?;

        // Subscribe after the initial listing so its reload is not shown twice.
        self.list().await?;
        let mut updates = self.store.subscribe();
        let runner = {
            let store = self.store.clone();
            tokio::spawn(async move { store.run(rx).await })
        };

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    println!();
                    print_conversations(&snapshot);
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping inbox watch");
                    break;
                }
            }
        }

        runner.abort();
        Ok(())
    }

    fn dump_config(&self) -> Result<()> {
        let contents =
            toml::to_string_pretty(&self.config).context("Failed to serialize config")?;
        println!("{}", contents);
        Ok(())
    }
}

fn print_conversations(snapshot: &ConversationSnapshot) {
    if snapshot.conversations().is_empty() {
        println!("No SMS Available");
        return;
    }

    let now = Local::now();
    for conversation in snapshot.conversations() {
        let (preview, stamp) = match conversation.latest() {
            Some(latest) => (
                truncate(&latest.body, PREVIEW_CHARS),
                format_timestamp(latest.timestamp, &now),
            ),
            None => (String::new(), String::new()),
        };
        println!(
            "{:<20} {:>12}  {} ({})",
            conversation.address,
            stamp,
            preview,
            conversation.len()
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    diagnostics::init_logging(&cli).context("Failed to initialize logging")?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!("Inbox: {}", config.inbox.path.display());
    info!("Translation chain: {:?}", config.translation.chain());

    let app = App::new(config);

    match &cli.command {
        Command::List => app.list().await,
        Command::Show { address } => app.show(address).await,
        Command::Translate { text } => app.translate(text).await,
        Command::TranslateThread { address } => app.translate_thread(address).await,
        Command::Watch => app.watch().await,
        Command::DumpConfig => app.dump_config(),
    }
}
