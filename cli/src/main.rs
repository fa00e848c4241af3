//! Tariff evaluation CLI
//!
//! Prices a charging session against an OCPI tariff document and prints the
//! cost breakdown as JSON.
//!
//! ```sh
//! # Default config (~/.config/ocpi-tariffs/config.toml)
//! tariff-eval --tariff tariff.json --session session.json
//!
//! # Explicit usage per dimension instead of deriving it from the session
//! tariff-eval --tariff tariff.json --session session.json --usage usage.json
//!
//! # Only validate the config and the tariff
//! tariff-eval --tariff tariff.json --check
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use clap::Parser;
use tracing::{error, info};

use ocpi_tariffs::config::{AppConfig, FallbackPolicy};
use ocpi_tariffs::domain::{SessionSnapshot, Tariff, Usage};
use ocpi_tariffs::support::{init_tracing, AppError};
use ocpi_tariffs::{default_config_path, BillingService};

/// Evaluate an OCPI tariff against a charging session.
#[derive(Parser, Debug)]
#[command(name = "tariff-eval", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "OCPI_TARIFFS_CONFIG")]
    config: Option<PathBuf>,

    /// OCPI tariff document (JSON).
    #[arg(short, long)]
    tariff: PathBuf,

    /// Session snapshot (JSON). Required unless --check is given.
    #[arg(short, long, required_unless_present = "check")]
    session: Option<PathBuf>,

    /// Usage per dimension (JSON object keyed by ENERGY, TIME, ...).
    /// Derived from the session when omitted.
    #[arg(short, long)]
    usage: Option<PathBuf>,

    /// Parking time in seconds, used when deriving usage from the session.
    #[arg(long, default_value_t = 0)]
    parking_seconds: i64,

    /// Price unmatched sessions with the first element instead of rejecting them.
    #[arg(long)]
    fallback_first: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and the tariff, then exit.
    #[arg(long)]
    check: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.fallback_first {
        config.evaluation.fallback = FallbackPolicy::FirstElement;
    }

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Failed to initialise logging: {e}");
    }
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => error!(
            "Failed to load config from {}: {}. Using defaults.",
            config_path.display(),
            e
        ),
    }

    // ── Tariff ─────────────────────────────────────────────────
    let tariff: Tariff = read_json(&cli.tariff).inspect_err(|e| {
        error!("Failed to read tariff {}: {}", cli.tariff.display(), e);
    })?;
    info!(
        tariff_id = %tariff.id(),
        currency = %tariff.currency(),
        elements = tariff.elements().len(),
        "Tariff loaded"
    );

    if cli.check {
        println!("Configuration and tariff are valid");
        println!("   Config file : {}", config_path.display());
        println!("   Tariff      : {} ({})", tariff.id(), tariff.currency());
        println!("   Elements    : {}", tariff.elements().len());
        println!("   Fallback    : {:?}", config.evaluation.fallback);
        return Ok(());
    }

    // ── Session & usage ────────────────────────────────────────
    let Some(session_path) = cli.session.as_deref() else {
        return Err("--session is required".into());
    };
    let session: SessionSnapshot = read_json(session_path)?;
    let usage = match cli.usage.as_deref() {
        Some(path) => read_json::<Usage>(path)?,
        None => {
            let parking = TimeDelta::try_seconds(cli.parking_seconds)
                .ok_or("--parking-seconds out of range")?;
            Usage::from_session(&session, parking)
        }
    };

    // ── Evaluate ───────────────────────────────────────────────
    let service = BillingService::new(config.evaluation.clone());
    let evaluation = service.evaluate(&tariff, &session, &usage)?;

    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}
