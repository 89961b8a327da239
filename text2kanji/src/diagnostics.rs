//! Command line and logging setup

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Text2Kanji command-line interface
#[derive(Parser, Debug)]
#[command(name = "text2kanji")]
#[command(about = "Browse an SMS inbox and translate messages to Japanese", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Enable JSON structured logging
    #[arg(long)]
    pub json_logs: bool,

    /// Show timestamps in logs
    #[arg(long)]
    pub timestamps: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List conversations with their latest message
    List,

    /// Show every message in one conversation, grouped by day
    Show {
        /// Sender address
        address: String,
    },

    /// Translate a piece of text through both stages
    Translate {
        /// Text to translate
        text: String,
    },

    /// Translate every message of a conversation
    TranslateThread {
        /// Sender address
        address: String,
    },

    /// Re-list conversations whenever the inbox export changes
    Watch,

    /// Show current configuration
    DumpConfig,
}

/// Initialize logging based on CLI configuration
pub fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = cli.log_level.parse::<Level>().with_context(|| {
        format!(
            "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
            cli.log_level
        )
    })?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.as_str()))
        .context("Failed to create log filter")?;

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match (cli.json_logs, cli.timestamps) {
        (true, true) => subscriber.json().init(),
        (true, false) => subscriber.without_time().json().init(),
        (false, true) => subscriber.init(),
        (false, false) => subscriber.without_time().init(),
    }

    info!(
        "Logging initialized: level={}, json={}, timestamps={}",
        log_level, cli.json_logs, cli.timestamps
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translate() {
        let cli = Cli::parse_from(["text2kanji", "translate", "Salamat po"]);
        assert!(matches!(cli.command, Command::Translate { ref text } if text == "Salamat po"));
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from([
            "text2kanji",
            "--log-level",
            "debug",
            "--json-logs",
            "--config",
            "/tmp/t2k.toml",
            "show",
            "+639171234567",
        ]);
        assert!(cli.json_logs);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t2k.toml")));
        assert!(matches!(cli.command, Command::Show { .. }));
    }
}
