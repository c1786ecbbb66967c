//! Smart Factory - Machine Maintenance Dashboard
//!
//! Serves the dashboard API over a machine sensor CSV and generates LLM
//! maintenance reports.
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API (default subcommand)
//! smart-factory --data sensors.csv
//!
//! # Print the dashboard view for one machine and day
//! smart-factory view --machine M-01 --start-date 2025-01-01 --end-date 2025-01-01
//!
//! # Generate a report
//! OPENAI_API_KEY=sk-... smart-factory report --machine M-01
//! ```
//!
//! # Environment Variables
//!
//! - `SMART_FACTORY_CONFIG`: Path to a config file (default: ./smart_factory.toml)
//! - `SMART_FACTORY_ADDR`: Server bind address
//! - `SMART_FACTORY_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `OPENAI_API_KEY`: API key for `report`
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use smart_factory::api::{create_app, DashboardState};
use smart_factory::{
    build_view, DashboardConfig, FilterQuery, FilterSelection, OpenAiClient, ReportError,
    ReportService, SensorLog,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "smart-factory")]
#[command(about = "Smart Manufacturing Dashboard - machine maintenance analytics and reports")]
#[command(version)]
struct CliArgs {
    /// Sensor CSV to read (overrides [data].csv_path)
    #[arg(long, global = true, value_name = "CSV")]
    data: Option<PathBuf>,

    /// Config file (overrides $SMART_FACTORY_CONFIG and ./smart_factory.toml)
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

/// Filter controls shared by `view` and `report`
#[derive(clap::Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Machine id (default: first machine in sorted order)
    #[arg(long)]
    machine: Option<String>,
    /// First day, YYYY-MM-DD (default: machine's first reading)
    #[arg(long)]
    start_date: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD (default: machine's last reading)
    #[arg(long)]
    end_date: Option<NaiveDate>,
    /// Start of the time-of-day range, HH:MM (default: 00:00)
    #[arg(long)]
    start_time: Option<String>,
    /// End of the time-of-day range, HH:MM (default: 23:59)
    #[arg(long)]
    end_time: Option<String>,
}

impl From<FilterArgs> for FilterQuery {
    fn from(args: FilterArgs) -> Self {
        Self {
            machine: args.machine,
            start_date: args.start_date,
            end_date: args.end_date,
            start_time: args.start_time,
            end_time: args.end_time,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API
    Serve {
        /// Override the server address (default: [server].addr)
        #[arg(short, long, env = "SMART_FACTORY_ADDR")]
        addr: Option<String>,
    },

    /// List machines and their observed date ranges
    Machines,

    /// Print the dashboard view for a selection as JSON
    View {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Render charts, request an LLM report and write it to the report directory
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        /// Chat API key
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

// ============================================================================
// Subcommands
// ============================================================================

fn load_config(args: &CliArgs) -> Result<DashboardConfig> {
    let mut config =
        DashboardConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(data) = &args.data {
        config.data.csv_path.clone_from(data);
    }
    Ok(config)
}

fn load_log(config: &DashboardConfig) -> Result<SensorLog> {
    SensorLog::load(&config.data.csv_path)
        .with_context(|| format!("Failed to load {}", config.data.csv_path.display()))
}

fn chat_client(config: &DashboardConfig) -> Result<Arc<OpenAiClient>> {
    let client = OpenAiClient::new(&config.llm).context("Failed to build chat client")?;
    Ok(Arc::new(client))
}

async fn run_serve(config: DashboardConfig, addr: Option<String>) -> Result<()> {
    let server_addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let client = chat_client(&config)?;

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Smart Factory - Machine Maintenance Dashboard");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        data = %config.data.csv_path.display(),
        reports = %config.report.output_dir.display(),
        model = %config.llm.model,
        "Configuration"
    );

    let app = create_app(DashboardState::new(config, client));

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;
    info!("✓ HTTP server listening on {}", server_addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await;

    match result {
        Ok(()) => {
            info!("Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "HTTP server error");
            Err(anyhow::anyhow!("HTTP server error: {e}"))
        }
    }
}

fn run_machines(config: &DashboardConfig) -> Result<()> {
    let log = load_log(config)?;
    for m in log.machine_summaries() {
        println!(
            "{}\t{} readings\t{} ~ {}",
            m.machine_id, m.readings, m.first_date, m.last_date
        );
    }
    Ok(())
}

fn run_view(config: &DashboardConfig, filter: FilterArgs) -> Result<()> {
    let log = load_log(config)?;
    let selection = FilterSelection::resolve(&log, &filter.into())?;
    let view = build_view(&log, &selection, &config.gauge);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn run_report(
    config: &DashboardConfig,
    filter: FilterArgs,
    api_key: Option<String>,
) -> Result<()> {
    // Checked before the CSV is read
    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(ReportError::MissingCredential)
        .context("Set --api-key or OPENAI_API_KEY")?;
    let service = ReportService::new(config, chat_client(config)?);

    let log = load_log(config)?;
    let selection = FilterSelection::resolve(&log, &filter.into())?;
    let view = build_view(&log, &selection, &config.gauge);

    let report = service
        .generate(&api_key, &view)
        .await
        .context("Report generation failed")?;
    info!(path = %report.path.display(), "Report saved");
    println!("{}", report.path.display());
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut args = CliArgs::parse();
    let config = load_config(&args)?;

    match args.command.take() {
        None => run_serve(config, std::env::var("SMART_FACTORY_ADDR").ok()).await,
        Some(SubCommand::Serve { addr }) => run_serve(config, addr).await,
        Some(SubCommand::Machines) => run_machines(&config),
        Some(SubCommand::View { filter }) => run_view(&config, filter),
        Some(SubCommand::Report { filter, api_key }) => run_report(&config, filter, api_key).await,
    }
}
