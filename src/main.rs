mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rand::RngCore;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use cli::{Cli, Commands};
use vidbox_core::config::Config;
use vidbox_core::media::is_supported_extension;
use vidbox_core::token::{HourBucket, StreamTokens};
use vidbox_core::{MediaId, MediaRecord, MemoryCatalog};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            config.apply_env();
            config.server.host = host;
            config.server.port = port;

            let catalog = scan_library(&config);
            tracing::info!("Cataloged {} media files", catalog.len());

            vidbox_server::start(config, Arc::new(catalog)).await?;
        }
        Commands::Validate { config } => {
            let path = config.or(cli.config);
            let mut cfg = Config::load_or_default(path.as_deref());
            cfg.apply_env();
            let warnings = cfg.validate();
            if warnings.is_empty() {
                println!("Configuration is valid");
            } else {
                for w in &warnings {
                    println!("warning: {w}");
                }
            }
        }
        Commands::GenerateSecret => {
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            println!("{}", hex::encode(bytes));
        }
        Commands::Token { id } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            config.apply_env();
            if config.stream.secret.is_empty() {
                anyhow::bail!("stream.secret is empty; set it in the config or VIDBOX_STREAM_SECRET");
            }
            let tokens = StreamTokens::new(config.stream.secret);
            println!("{}", tokens.generate(MediaId::from(id), HourBucket::now()));
        }
        Commands::Version => {
            println!("vidbox {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Walk the configured media roots and build an in-memory catalog.
///
/// This is a stand-in for the external catalog database: ids are assigned in
/// walk order, so they are only stable while the library does not change.
fn scan_library(config: &Config) -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    let mut next_id: i64 = 1;

    for root in &config.media.roots {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let ext = entry
                .path()
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if !is_supported_extension(&ext) {
                continue;
            }
            catalog.insert(MediaRecord::from_path(MediaId::from(next_id), entry.path()));
            next_id += 1;
        }
    }

    catalog
}
