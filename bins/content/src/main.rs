//! Haven content attachment CLI.
//!
//! Usage:
//!   haven-content sync  --entity pets --record 5 --payload pet.json
//!   haven-content list  --entity pets --record 5
//!   haven-content purge --entity pets --record 5
//!
//! `sync` reads a full JSON record body, as posted by the admin form, and
//! reconciles the attachment slots it carries. Reports are printed as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use haven_core::content::{AttachmentReconciler, ViewerPreviewResolver};
use haven_core::media::ImageCompressor;
use haven_core::storage::{StorageConfig, StorageService};
use haven_db::{SeaUnitOfWork, content_registry};
use haven_shared::{AppConfig, RecordId};

#[derive(Parser)]
#[command(name = "haven-content")]
#[command(author, version, about = "Reconcile content attachments of Haven records")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Target {
    /// Parent entity (news, articles, pets, transactions)
    #[arg(short, long)]
    entity: String,

    /// Parent record id
    #[arg(short, long)]
    record: RecordId,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a record's attachments against a JSON record body
    Sync {
        #[command(flatten)]
        target: Target,

        /// JSON file holding the record body
        #[arg(short, long)]
        payload: PathBuf,
    },

    /// Print the display URLs of a record's attachments
    List {
        #[command(flatten)]
        target: Target,
    },

    /// Delete every attachment of a record
    Purge {
        #[command(flatten)]
        target: Target,
    },
}

impl Commands {
    fn target(&self) -> &Target {
        match self {
            Self::Sync { target, .. } | Self::List { target } | Self::Purge { target } => target,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the JSON report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "haven=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let uow = SeaUnitOfWork::connect(&config.database).await?;
    let storage = Arc::new(StorageService::from_config(StorageConfig::from_settings(
        &config.storage,
    ))?);
    info!(provider = storage.provider_name(), "Storage configured");
    let preview = Arc::new(ViewerPreviewResolver::new(
        config.preview.viewer_url.clone(),
        Arc::clone(&storage),
    ));

    let target = cli.command.target();
    let slots = content_registry()?.into_slots(&target.entity)?;
    let reconciler = AttachmentReconciler::new(Arc::new(uow.clone()), storage, preview, slots)?
        .with_compressor(ImageCompressor::new(config.image.target_height));

    let report = match &cli.command {
        Commands::Sync { target, payload } => {
            let raw = std::fs::read_to_string(payload)
                .with_context(|| format!("Failed to read {}", payload.display()))?;
            let body: Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", payload.display()))?;
            let payload = reconciler.extract_payload(&body)?;
            serde_json::to_value(reconciler.sync(target.record, &payload).await?)?
        }
        Commands::List { target } => {
            serde_json::to_value(reconciler.list_attachments(target.record).await?)?
        }
        Commands::Purge { target } => {
            serde_json::to_value(reconciler.purge_attachments(target.record).await?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    drop(reconciler);
    uow.close().await?;
    Ok(())
}
