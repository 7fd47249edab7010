//! Marketplace pricing engine - CLI server
//!
//! Headless pricing service suitable for deployment as a systemd service,
//! Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/marketplace-pricing/config.toml)
//! pricing-service
//!
//! # Custom config path
//! pricing-service --config /etc/marketplace-pricing/config.toml
//!
//! # Override the port
//! pricing-service --api-port 8080
//!
//! # Validate the config and rate card without starting
//! pricing-service --check
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info};

use marketplace_pricing::config::{AppConfig, CONFIG_PATH_ENV};
use marketplace_pricing::server::{init_tracing, ServerHandle, ServerOptions};
use marketplace_pricing::shared::errors::ConfigError;
use marketplace_pricing::shared::money::format_minor_units;

/// Marketplace pricing engine: quotes packaging, fulfillment, duty,
/// delivery and cross-border fees for orders.
#[derive(Parser, Debug)]
#[command(
    name = "pricing-service",
    version,
    about = "Fee composition engine for marketplace orders",
    long_about = "Marketplace pricing engine - REST API that prices orders \
                  against a configurable rate card.\n\n\
                  Default config: ~/.config/marketplace-pricing/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and rate card, print them and exit.
    #[arg(long)]
    check: bool,
}

/// `Ok(None)` when the file does not exist.
fn load_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    match AppConfig::load(path) {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn print_check(config: &AppConfig, config_path: &Path) {
    let pricing = &config.pricing;
    let money = |amount| format_minor_units(amount, &pricing.currency);

    println!("Configuration is valid");
    println!("   Config file      : {}", config_path.display());
    println!("   API address      : {}", config.server.address());
    println!("   Log level        : {}", config.logging.level);
    println!("   Currency         : {}", pricing.currency);
    println!("   Packaging tiers  :");
    for tier in &pricing.packaging_tiers {
        let upper = tier
            .max_quantity
            .map(|max| max.to_string())
            .unwrap_or_else(|| "+".to_string());
        println!(
            "      {:>6} - {:<6} {}",
            tier.min_quantity,
            upper,
            money(tier.unit_fee)
        );
    }
    println!("   Fallback fee     : {}", money(pricing.fallback_unit_fee));
    println!("   Fulfillment rate : {}", pricing.fulfillment_rate);
    println!("   Duty rounding    : {}", pricing.duty_rounding);
    println!("   Duty rates       :");
    for (category, rate) in pricing.duty_rates.iter() {
        println!("      {:<12} {}", category, rate);
    }
    println!("   Delivery costs   :");
    for (region, range) in pricing.delivery_costs.iter() {
        println!(
            "      {:<12} {} - {}",
            region,
            money(range.min),
            money(range.max)
        );
    }
    println!(
        "   Cross-border fee : {} - {}",
        money(pricing.cross_border_fee.min),
        money(pricing.cross_border_fee.max)
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(marketplace_pricing::default_config_path);

    let loaded = load_config(&config_path)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config);
    if found {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        error!("Config file {} not found", config_path.display());
        error!("Using default configuration.");
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            error!("Invalid rate card: {}", e);
            return Err(e.into());
        }
        print_check(&config, &config_path);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions { config }).await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
