//! Alarm catalog assistant daemon.
//!
//! Loads the catalog in the background, keeps it fresh on a
//! modification-time check, and drives the menu conversation. The stdin
//! loop below is a thin stand-in for the transport layer: it only calls
//! the engine and prints what comes back.

use alarmad::cache::CatalogCache;
use alarmad::config::{DaemonConfig, CONFIG_PATH};
use alarmad::conversation::ConversationEngine;
use alarmad::loader::SourceDescriptor;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "alarmad", version, about = "Asistente de alarmas de plataformas Core")]
struct Args {
    /// Config file path
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Catalog source file, overriding the config
    #[arg(long)]
    source: Option<PathBuf>,

    /// Worksheet name for workbook sources, overriding the config
    #[arg(long)]
    sheet: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = DaemonConfig::load(&args.config);
    if let Some(source) = args.source {
        config.source.path = source;
    }
    if let Some(sheet) = args.sheet {
        config.source.sheet = Some(sheet);
    }

    info!("alarmad v{} starting", alarma_common::VERSION);
    info!("Catalog source: {}", config.source.path.display());

    let descriptor = SourceDescriptor::new(config.source.path.clone())
        .with_candidates(config.source.candidates.clone())
        .with_sheet(config.source.sheet.clone());
    let cache = Arc::new(CatalogCache::new(descriptor));
    cache.spawn_initial_load();

    let engine = Arc::new(ConversationEngine::new(Arc::clone(&cache), &config));

    let refresh_cache = Arc::clone(&cache);
    let refresh_engine = Arc::clone(&engine);
    let refresh_every = Duration::from_secs(config.source.refresh_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh_every);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            refresh_cache.refresh_if_stale().await;
            refresh_engine.prune_sessions().await;
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    let greeting = engine.advance("local", "").await;
    stdout
        .write_all(format!("{}\n> ", greeting.text).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.eq_ignore_ascii_case("salir") {
            break;
        }
        if message.eq_ignore_ascii_case("estado") {
            let status = cache.status().await;
            stdout
                .write_all(format!("{}\n> ", serde_json::to_string_pretty(&status)?).as_bytes())
                .await?;
            stdout.flush().await?;
            continue;
        }
        let reply = engine.advance("local", message).await;
        stdout
            .write_all(format!("{}\n> ", reply.text).as_bytes())
            .await?;
        stdout.flush().await?;
    }

    info!("alarmad shutting down");
    Ok(())
}
