//! tgaudio-rs — download audio from a Telegram channel.
//!
//! Scans one channel's message history and saves every music track, voice
//! note and audio document that is not already on disk. Authentication,
//! pagination and file transfer go through the MTProto client library; this
//! crate decides what counts as audio, what to call it, and whether it needs
//! fetching.

#![warn(clippy::all)]

mod cli;
mod config;
mod download;
mod shutdown;
mod telegram;
mod types;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use telegram::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal; any other problem is worth a warning once
    // logging is up.
    let dotenv = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Could not load .env file: {}", e),
    }

    let config = config::Config::from_cli(cli)?;
    tracing::debug!(?config, "Starting tgaudio-rs");

    let (store, session) = SessionStore::open(&config.session_path).await?;
    let client = telegram::connect(config.api_id, &config.api_hash, session).await?;

    let result = run(&config, &client, &store).await;

    // Persist whatever the client learned (DC migrations, peer cache) even
    // when the run failed part-way.
    if let Err(e) = store.save(&client) {
        tracing::warn!("Could not save session to {}: {}", store.path().display(), e);
    }

    result
}

async fn run(
    config: &config::Config,
    client: &grammers_client::Client,
    store: &SessionStore,
) -> anyhow::Result<()> {
    telegram::auth::ensure_authorized(client, config.phone.as_deref(), store).await?;

    if config.auth_only {
        tracing::info!("Authentication completed successfully");
        return Ok(());
    }

    let Some(channel_ref) = &config.channel else {
        anyhow::bail!("No channel configured");
    };

    tracing::info!("Fetching messages from channel: {}", channel_ref);
    let chat = telegram::resolve_channel(client, channel_ref).await?;
    tracing::info!("Channel found: {}", chat.name());

    let channel_dir = download::paths::channel_directory(&config.directory, chat.name(), chat.id());

    let download_config = download::DownloadConfig {
        ignore_list: config.ignore_list.clone(),
        skip_created_before: config
            .skip_created_before
            .map(|d| d.with_timezone(&chrono::Utc)),
        skip_created_after: config
            .skip_created_after
            .map(|d| d.with_timezone(&chrono::Utc)),
        dry_run: config.dry_run,
        no_progress_bar: config.no_progress_bar,
    };

    let shutdown_token = shutdown::install_signal_handler()?;

    let mut history = telegram::TelegramHistory::open(client, &chat, config.recent).await;
    let summary = download::download_channel(
        &mut history,
        &channel_dir,
        &download_config,
        shutdown_token,
    )
    .await?;

    if summary.errors > 0 {
        anyhow::bail!(
            "{} of {} downloads failed",
            summary.errors,
            summary.downloaded + summary.errors
        );
    }

    Ok(())
}
