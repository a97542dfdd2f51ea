mod api;
mod bulk;
mod import;
mod single;

use clap::{Parser, Subcommand};
use herald_channels::whatsapp::WhatsAppBridge;
use herald_core::config::{self, shellexpand, Config};
use herald_core::contact::ContactStore;
use herald_core::template::TemplateCatalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "herald",
    version,
    about = "Herald: rate-limited WhatsApp campaign sender"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API and the dashboard.
    Serve {
        /// Port to listen on (overrides `api.port`).
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Check bridge readiness and the loaded contacts and templates.
    Status,
    /// Print pairing QR codes until the WhatsApp session is ready.
    Pair,
    /// Build the contacts file from registration CSV exports.
    Import {
        /// Running registration export.
        #[arg(long)]
        running: Option<PathBuf>,
        /// Senam registration export.
        #[arg(long)]
        senam: Option<PathBuf>,
        /// Tenant registration export.
        #[arg(long)]
        tenant: Option<PathBuf>,
        /// Output file (defaults to `data.contacts_path`).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Country code used to normalize local phone numbers.
        #[arg(long, default_value = "62")]
        country_code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_tracing(&cfg);

    match cli.command {
        Commands::Serve { port } => {
            let bridge = WhatsAppBridge::new(cfg.whatsapp.clone());
            if let Err(e) = bridge.refresh_status().await {
                warn!("whatsapp bridge not reachable yet: {e}");
            }
            tokio::spawn(bridge.clone().watch_status());

            let contacts = Arc::new(ContactStore::load(&cfg.data.contacts_path)?);
            let templates = Arc::new(TemplateCatalog::load(&cfg.data.templates_path)?);
            info!(
                "{} starting with {} contacts and {} templates",
                cfg.herald.name,
                contacts.len(),
                templates.len()
            );

            let bulk = bulk::BulkSender::new(Arc::new(bridge), contacts, &cfg.bulk);
            let state = api::ApiState::new(bulk, templates, &cfg.api.api_key);
            api::serve(&cfg.api, port.unwrap_or(cfg.api.port), state).await?;
        }
        Commands::Status => {
            println!("{} status\n", cfg.herald.name);
            println!("Config: {}", cli.config);
            println!("Bridge: {}", cfg.whatsapp.bridge_url);

            let bridge = WhatsAppBridge::new(cfg.whatsapp.clone());
            match bridge.refresh_status().await {
                Ok(status) => {
                    println!("  ready: {}", status.ready);
                    println!("  needs pairing: {}", status.needs_authentication());
                }
                Err(e) => println!("  unreachable: {e}"),
            }
            println!();

            let contacts = ContactStore::load(&cfg.data.contacts_path)?;
            println!("Contacts: {} ({})", contacts.len(), cfg.data.contacts_path);
            for (category, count) in contacts.count_by_category() {
                println!("  {category}: {count}");
            }
            let templates = TemplateCatalog::load(&cfg.data.templates_path)?;
            println!(
                "Templates: {} ({})",
                templates.len(),
                cfg.data.templates_path
            );
        }
        Commands::Pair => {
            println!("Waiting for the WhatsApp bridge at {}...", cfg.whatsapp.bridge_url);
            let bridge = WhatsAppBridge::new(cfg.whatsapp.clone());
            bridge.wait_until_paired().await;
            println!("WhatsApp session is ready.");
        }
        Commands::Import {
            running,
            senam,
            tenant,
            output,
            country_code,
        } => {
            if running.is_none() && senam.is_none() && tenant.is_none() {
                anyhow::bail!(
                    "no input files. Usage: herald import --running F --senam F --tenant F"
                );
            }
            let options = import::ImportOptions {
                running,
                senam,
                tenant,
                output: output.unwrap_or_else(|| PathBuf::from(&cfg.data.contacts_path)),
                country_code,
            };

            let summary = import::run(&options)?;
            for (category, count) in &summary.parsed {
                println!("{category} participants: {count}");
            }
            println!("\nTotal contacts: {}", summary.total);
            println!("Contacts with valid phone: {}", summary.written);
            println!("\nSaved to {}", options.output.display());
            println!("\nBy category:");
            for (category, count) in &summary.by_category {
                println!("  {category}: {count}");
            }
        }
    }

    Ok(())
}

/// Console logging plus an ANSI-free copy under `{data_dir}/logs`.
///
/// `RUST_LOG` takes precedence over `herald.log_level`. The returned guard
/// flushes the file writer and must live until exit.
fn init_tracing(cfg: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.herald.log_level));

    let log_dir = Path::new(&shellexpand(&cfg.herald.data_dir)).join("logs");
    let (file_layer, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&log_dir, "herald.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("file logging disabled, cannot create {}: {e}", log_dir.display());
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}
