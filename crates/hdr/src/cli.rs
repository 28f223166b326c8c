//! Command line interface

use anyhow::Context;
use clap::{Parser, Subcommand};
use hdr_domain::entities::{Holon, HolonType};
use hdr_domain::value_objects::{ProviderCategory, ProviderType};
use hdr_infrastructure::config::{AppConfig, ConfigLoader};
use hdr_infrastructure::di::init_app;
use hdr_infrastructure::logging::init_logging;
use hdr_providers::InMemoryHolonProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Command line interface for HyperDrive Router
#[derive(Parser, Debug)]
#[command(name = "hdr")]
#[command(about = "HyperDrive Router - multi-backend data-access router")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load and validate configuration, then print the effective values
    CheckConfig,

    /// Run a predictive failover scan against in-memory providers
    Scan {
        /// Saves routed through the providers before scanning
        #[arg(long, default_value_t = 0)]
        warmup: u32,
    },
}

/// Execute a command and return its JSON output
pub async fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::CheckConfig => {
            serde_json::to_string_pretty(&config).context("Failed to render configuration")
        }
        Command::Scan { warmup } => {
            if let Err(e) = init_logging(&config.logging) {
                eprintln!("Logging disabled: {e}");
            }
            scan(config, *warmup).await
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.with_config_path(path);
    }
    loader.load().context("Failed to load configuration")
}

/// Providers named anywhere in the routing section, in first-mention order
pub fn configured_providers(config: &AppConfig) -> Vec<ProviderType> {
    let routing = &config.routing;
    let mut providers = vec![routing.current_storage_provider];
    providers.extend(routing.auto_failover_providers.iter().copied());
    providers.extend(routing.auto_load_balance_providers.iter().copied());
    providers.extend(routing.auto_replication_providers.iter().copied());

    let mut seen = Vec::new();
    for provider in providers {
        if !provider.is_default() && !seen.contains(&provider) {
            seen.push(provider);
        }
    }
    seen
}

async fn scan(config: AppConfig, warmup: u32) -> anyhow::Result<String> {
    let providers = configured_providers(&config);
    let context = init_app(config).context("Failed to initialize routing services")?;
    let router = context.router();
    for provider in &providers {
        router
            .register_provider(
                ProviderCategory::Storage,
                Arc::new(InMemoryHolonProvider::new(*provider)),
            )
            .with_context(|| format!("Failed to register {provider}"))?;
    }
    info!(providers = providers.len(), warmup, "Scanning in-memory providers");

    let holons = context.holons();
    for i in 0..warmup {
        let holon = Holon::new(format!("warmup-{i}"), HolonType::Holon);
        if let Err(e) = holons.save_holon(holon, ProviderType::Default).await {
            warn!(error = %e, "Warmup save failed");
        }
    }

    let report = router.predict_and_prevent();
    serde_json::to_string_pretty(&report).context("Failed to render report")
}
