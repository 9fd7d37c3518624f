// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! recap - daily topic-grouped Telegram chat summaries.
//!
//! Binary entry point: loads and validates configuration, opens the
//! database, wires the LLM client, summarizer, notifier, and scheduler,
//! then waits for SIGINT/SIGTERM.

mod shutdown;

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::Parser;
use recap_config::{
    figment_to_config_errors, load_config_from_path, render_errors, validate_config, RecapConfig,
};
use recap_core::RecapError;
use recap_llm::LlmClient;
use recap_scheduler::Scheduler;
use recap_storage::{Database, MessageStore};
use recap_summarizer::Summarizer;
use recap_telegram::TelegramNotifier;
use tracing::info;

/// Daily topic-grouped chat summaries.
#[derive(Parser, Debug)]
#[command(name = "recap", version, about, long_about = None)]
struct Cli {
    /// Path to the config file.
    #[arg(short = 'f', value_name = "PATH", default_value = "etc/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli.config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(config_path: &Path) -> Result<(), RecapError> {
    let config = load_config(config_path)?;

    init_tracing(&config.log.level);
    info!(config = %config_path.display(), "starting recap");

    // The database file's directory must exist before SQLite opens it.
    if let Some(parent) = Path::new(&config.storage.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RecapError::Config(format!(
                    "failed to create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }

    let db = Database::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "database ready");

    let proxy_url = config.proxy.url();
    if proxy_url.is_some() {
        info!(host = %config.proxy.host, port = config.proxy.port, "using SOCKS5 proxy");
    }

    let llm = LlmClient::new(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        config.llm.model.clone(),
        config.llm.max_tokens,
        proxy_url.clone(),
    )?;
    info!(model = %config.llm.model, budget = llm.max_input_tokens(), "LLM client ready");

    let summarizer = Arc::new(Summarizer::new(
        Arc::new(llm),
        Arc::new(MessageStore::new(db.clone())),
    ));
    let notifier = Arc::new(TelegramNotifier::new(
        &config.telegram,
        &config.summary,
        proxy_url,
    )?);

    let scheduler = Arc::new(Scheduler::new(
        db.clone(),
        summarizer,
        notifier,
        config.summary.clone(),
    ));
    scheduler.start().await?;

    let cancel = shutdown::install_signal_handler();
    cancel.cancelled().await;

    info!("shutting down");
    scheduler.stop().await;
    db.close().await?;
    info!("recap stopped");
    Ok(())
}

/// Load and validate the configuration, rendering rich diagnostics to
/// stderr on failure.
fn load_config(path: &Path) -> Result<RecapConfig, RecapError> {
    let config = match load_config_from_path(path) {
        Ok(config) => config,
        Err(e) => {
            let sources = match std::fs::read_to_string(path) {
                Ok(content) => vec![(path.display().to_string(), content)],
                Err(_) => Vec::new(),
            };
            render_errors(&figment_to_config_errors(e, &sources));
            return Err(RecapError::Config(format!(
                "invalid configuration in {}",
                path.display()
            )));
        }
    };

    if let Err(errors) = validate_config(&config) {
        render_errors(&errors);
        return Err(RecapError::Config(format!(
            "invalid configuration in {}",
            path.display()
        )));
    }

    Ok(config)
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recap={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_etc_config() {
        let cli = Cli::try_parse_from(["recap"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("etc/config.yaml"));
    }

    #[test]
    fn cli_accepts_f_flag() {
        let cli = Cli::try_parse_from(["recap", "-f", "/tmp/other.yaml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/other.yaml"));
    }
}
