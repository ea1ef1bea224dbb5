//! AgriFusion ML API
//!
//! # Usage
//!
//! ```bash
//! # Serve /get_fertilizer and /predict (fits models at startup if none are saved)
//! agrifusion
//!
//! # Train both models and write JSON artifacts to the model directory
//! agrifusion train
//! ```
//!
//! # Environment Variables
//!
//! - `AGRIFUSION_CONFIG`: Path to the TOML config file
//! - `AGRIFUSION_SERVER_ADDR`: Listen address (default: 0.0.0.0:5000)
//! - `AGRIFUSION_CORS_ORIGINS`: Comma-separated allowed origins (default: any)
//! - `AGRIFUSION_LOG_FORMAT`: `text` or `json`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use agrifusion::api::{create_app, ServiceState};
use agrifusion::config::{defaults, ServiceConfig};
use agrifusion::ml_engine::training::{train_crop_file, train_fertilizer_file};
use agrifusion::ml_engine::{ModelRegistry, ModelStore};
use agrifusion::reference::DoseTable;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "agrifusion")]
#[command(about = "AgriFusion crop and fertilizer recommendation API")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "AGRIFUSION_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API (default)
    Serve {
        /// Override the listen address
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Train the fertilizer and crop models and save them
    Train {
        /// Fraction of rows held out for the accuracy report
        #[arg(long, default_value_t = defaults::TEST_FRACTION)]
        test_fraction: f64,

        /// Shuffle seed for the train/test split
        #[arg(long, default_value_t = defaults::SPLIT_SEED)]
        seed: u64,

        /// Override the model output directory
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

// ============================================================================
// Subcommands
// ============================================================================

async fn serve(config: ServiceConfig, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| config.server.addr.clone());

    let registry = ModelRegistry::load(&config.data).context("Failed to load models")?;
    let dose_table = DoseTable::load(&config.data.dose_table).with_context(|| {
        format!(
            "Failed to load dosage table {}",
            config.data.dose_table.display()
        )
    })?;
    if dose_table.is_empty() {
        warn!("Dosage table has no rows, every fertilizer request will return 404");
    }

    let state = ServiceState::new(registry, dose_table, config.defaults.clone());
    let app = create_app(state, &config.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(addr = %addr, "HTTP server listening");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel_token.cancelled().await })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

fn train(
    config: &ServiceConfig,
    test_fraction: f64,
    seed: u64,
    model_dir: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..1.0).contains(&test_fraction),
        "--test-fraction must be in [0, 1), got {test_fraction}"
    );
    let store = ModelStore::new(model_dir.unwrap_or_else(|| config.data.model_dir.clone()));

    let (artifacts, report) =
        train_fertilizer_file(&config.data.fertilizer_training, test_fraction, seed)
            .context("Fertilizer training failed")?;
    store
        .save_fertilizer(&artifacts)
        .context("Failed to save fertilizer model")?;
    println!("{}", serde_json::to_string(&report)?);

    if config.data.crop_training.is_file() {
        let (model, report) = train_crop_file(&config.data.crop_training, test_fraction, seed)
            .context("Crop training failed")?;
        store.save_crop(&model).context("Failed to save crop model")?;
        println!("{}", serde_json::to_string(&report)?);
    } else {
        warn!(
            path = %config.data.crop_training.display(),
            "Crop training data not found, skipping crop model"
        );
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_format);

    let config = ServiceConfig::load(args.config.as_deref()).context("Failed to load config")?;

    match args.command.unwrap_or(SubCommand::Serve { addr: None }) {
        SubCommand::Serve { addr } => serve(config, addr).await,
        SubCommand::Train {
            test_fraction,
            seed,
            model_dir,
        } => train(&config, test_fraction, seed, model_dir),
    }
}
