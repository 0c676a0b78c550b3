//! Margin Defense - cement plant scenario engine
//!
//! Serves the what-if projection API for the margin defense dashboard, and
//! runs single projections from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Serve the API (default when no subcommand is given)
//! margin-defense serve --addr 127.0.0.1:8080
//!
//! # One-off projections, printed as JSON
//! margin-defense financials --fuel 10 --volume -5 --price 3
//! margin-defense raw-mix --share limestone=90 --share clay=8 --share iron_ore=2
//! margin-defense clinker --target 76.5
//! margin-defense packaging --gsm 75
//! margin-defense ask "Why is HFO so expensive?"
//! ```
//!
//! # Environment Variables
//!
//! - `MARGIN_DEFENSE_CONFIG`: Path to the plant config TOML
//! - `MARGIN_DEFENSE_ADDR`: Server bind address override
//! - `MARGIN_DEFENSE_CORS_ORIGINS`: Comma-separated allowed origins
//! - `MARGIN_DEFENSE_LOG_FORMAT`: `json` for JSON-lines logs
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use margin_defense::api::{create_app, DashboardState};
use margin_defense::config::{PlantConfig, CONFIG_ENV_VAR, LOCAL_CONFIG_FILE};
use margin_defense::insights;
use margin_defense::projection_engine::build_waterfall;
use margin_defense::session::{Driver, RangePolicy, ScenarioSession};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "margin-defense")]
#[command(about = "Cement plant cost-margin scenario engine")]
#[command(version)]
struct CliArgs {
    /// Plant config TOML (default: $MARGIN_DEFENSE_CONFIG, then ./plant_config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the HTTP API
    Serve {
        /// Override the server address (default: config `server.addr`)
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Project net profit and margin under top-line drivers (%)
    Financials {
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        fuel: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        volume: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        price: f64,
    },
    /// Re-price the raw mix; unspecified components keep baseline shares
    RawMix {
        /// Component share as NAME=PERCENT, repeatable
        #[arg(long = "share", value_parser = parse_share)]
        shares: Vec<(String, f64)>,
    },
    /// Project strength and savings for a target clinker factor (%)
    Clinker {
        #[arg(long)]
        target: f64,
    },
    /// Project breakage and spend for a bag specification (GSM)
    Packaging {
        #[arg(long)]
        gsm: u32,
    },
    /// Project power cost for a gas utilization share (%)
    Power {
        #[arg(long)]
        gas: f64,
    },
    /// Print the P&L margin waterfall
    Waterfall,
    /// Look up an executive insight
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Validate a config file and print the effective configuration
    CheckConfig,
}

fn parse_share(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PERCENT, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid share '{value}': {e}"))?;
    Ok((name.trim().to_string(), value))
}

// ============================================================================
// Helpers
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<PlantConfig> {
    match path {
        Some(p) => PlantConfig::load_from_file(p)
            .with_context(|| format!("Failed to load plant config from {}", p.display())),
        None => Ok(PlantConfig::load()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

/// CLI projections reject out-of-range input instead of clamping it.
fn cli_session(config: &PlantConfig) -> ScenarioSession {
    ScenarioSession::new(config, RangePolicy::Reject)
}

async fn serve(config: PlantConfig, addr: Option<String>) -> Result<()> {
    let server_addr = addr
        .or_else(|| std::env::var("MARGIN_DEFENSE_ADDR").ok())
        .unwrap_or_else(|| config.server.addr.clone());

    info!(plant = %config.plant.name, period = %config.plant.period, "Starting margin defense API");
    let app = create_app(DashboardState::new(Arc::new(config)));

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;
    info!("HTTP server listening on {}", server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr; stdout carries CLI output
    let json = std::env::var("MARGIN_DEFENSE_LOG_FORMAT")
        .is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_ref())?;

    match args.command.unwrap_or(SubCommand::Serve { addr: None }) {
        SubCommand::Serve { addr } => serve(config, addr).await?,
        SubCommand::Financials { fuel, volume, price } => {
            let mut session = cli_session(&config);
            session.set_driver(&config, Driver::FuelPrice, fuel)?;
            session.set_driver(&config, Driver::ProductionVolume, volume)?;
            session.set_driver(&config, Driver::CementPrice, price)?;
            print_json(&session.project(&config)?.financials)?;
        }
        SubCommand::RawMix { shares } => {
            let mut session = cli_session(&config);
            for (component, value) in &shares {
                session.set_mix_share(&config, component, *value)?;
            }
            let projection = session.project(&config)?.raw_material;
            if let Some(w) = projection.mix_warning {
                tracing::warn!("{}", w);
            }
            print_json(&projection)?;
        }
        SubCommand::Clinker { target } => {
            let mut session = cli_session(&config);
            session.set_driver(&config, Driver::ClinkerFactor, target)?;
            let projection = session.project(&config)?.clinker;
            info!(verdict = %projection.verdict, "{}", projection.verdict.message());
            print_json(&projection)?;
        }
        SubCommand::Packaging { gsm } => {
            let mut session = cli_session(&config);
            session.set_bag_spec(&config, gsm)?;
            print_json(&session.project(&config)?.packaging)?;
        }
        SubCommand::Power { gas } => {
            let mut session = cli_session(&config);
            session.set_driver(&config, Driver::GasUtilization, gas)?;
            print_json(&session.project(&config)?.power)?;
        }
        SubCommand::Waterfall => print_json(&build_waterfall(&config.pnl))?,
        SubCommand::Ask { question } => print_json(&insights::ask(&question.join(" ")))?,
        SubCommand::CheckConfig => {
            let path = args
                .config
                .clone()
                .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
            let checked = PlantConfig::load_from_file(&path)
                .with_context(|| format!("{} is not a valid plant config", path.display()))?;
            info!(path = %path.display(), plant = %checked.plant.name, "Config is valid");
            println!("{}", checked.to_toml()?);
        }
    }

    Ok(())
}
