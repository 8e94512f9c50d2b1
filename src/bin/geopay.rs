//! GeoPay Command Line Interface
//!
//! Runs the capture flow in a terminal against a native position provider.
//!
//! # Usage
//!
//! ```bash
//! # Capture a fix (simulated at the given coordinate) and show the report
//! geopay locate --lat -1.2921 --lon 36.8219 --delay-ms 800
//!
//! # Simulate a denied permission prompt
//! geopay locate --fail "User denied Geolocation"
//!
//! # Map view model for the configured suppliers, as JSON
//! geopay render --lat -1.2921 --lon 36.8219
//!
//! # Supplier cards / config check
//! geopay suppliers
//! geopay check-config --config config/geopay.yaml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use geopay::geopay_core::{
    AcquisitionState, Coordinate, PositionFailure, PositionProvider, RequestOutcome,
    StatusRegion, ViewOutput,
};
use geopay::{
    telemetry, CaptureReport, CaptureSession, FixedPositionProvider, GeoPayConfig,
    UnsupportedPlatform,
};

#[derive(Parser)]
#[command(name = "geopay")]
#[command(version = "0.1.0")]
#[command(about = "Capture a GPS fix and verify it against supplier hubs")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to GEOPAY_CONFIG, then config/geopay.yaml)
    #[arg(long, short, global = true, env = "GEOPAY_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a position fix and show status, map and proximity checks
    Locate {
        /// Simulated fix latitude (defaults to the map fallback center)
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        /// Simulated fix longitude
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,

        /// Simulated time to first fix in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Behave like a host without location capability
        #[arg(long, conflicts_with = "fail")]
        unsupported: bool,

        /// Make the platform call fail with this message ("" for none)
        #[arg(long)]
        fail: Option<String>,
    },

    /// Print the map view model for an optional user position
    Render {
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
    },

    /// List supplier hubs
    Suppliers,

    /// Load and validate the configuration
    CheckConfig,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let result = run(&cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            } else {
                eprintln!("{} {:#}", "error:".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::Locate {
            lat,
            lon,
            delay_ms,
            unsupported,
            fail,
        } => {
            let provider = build_provider(
                &config,
                position(*lat, *lon),
                *delay_ms,
                *unsupported,
                fail.clone(),
            );
            cmd_locate(&config, provider, cli.format).await
        }
        Commands::Render { lat, lon } => cmd_render(&config, position(*lat, *lon), cli.format),
        Commands::Suppliers => cmd_suppliers(&config, cli.format),
        Commands::CheckConfig => cmd_check_config(&config, cli.format),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GeoPayConfig> {
    let config = match path {
        Some(path) => {
            let mut config = GeoPayConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            config
        }
        None => GeoPayConfig::load().context("loading configuration")?,
    };
    tracing::info!(suppliers = config.suppliers.len(), "Configuration loaded");
    Ok(config)
}

fn position(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinate> {
    lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon))
}

fn build_provider(
    config: &GeoPayConfig,
    fix: Option<Coordinate>,
    delay_ms: u64,
    unsupported: bool,
    fail: Option<String>,
) -> Arc<dyn PositionProvider> {
    if unsupported {
        return Arc::new(UnsupportedPlatform);
    }
    let provider = match fail {
        Some(message) => FixedPositionProvider::failing(PositionFailure::new(None, message)),
        None => FixedPositionProvider::new(fix.unwrap_or(config.map.fallback_center)),
    };
    Arc::new(provider.with_delay(Duration::from_millis(delay_ms)))
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn cmd_locate(
    config: &GeoPayConfig,
    provider: Arc<dyn PositionProvider>,
    format: OutputFormat,
) -> Result<()> {
    let session = CaptureSession::new(config, provider);

    let mut rx = session.source().subscribe();
    let show_progress = format == OutputFormat::Pretty;
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if show_progress {
                eprintln!("{} {}", "→".dimmed(), state_line(&state));
            }
            if !state.is_pending() {
                break;
            }
        }
    });

    let outcome = session.capture().await;
    printer.await.context("state printer task")?;

    if outcome == RequestOutcome::AlreadyPending {
        tracing::warn!("Request ignored: another request is pending");
    }

    let report = session.report();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Pretty => print_report(&report, config.verification.radius_m),
    }
    Ok(())
}

fn cmd_render(config: &GeoPayConfig, user: Option<Coordinate>, format: OutputFormat) -> Result<()> {
    let view = geopay::geopay_core::MapView::new(config.map_settings())
        .render(user, &config.suppliers);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Pretty => print_view(&view),
    }
    Ok(())
}

fn cmd_suppliers(config: &GeoPayConfig, format: OutputFormat) -> Result<()> {
    let cards = geopay::geopay_core::supplier_cards(&config.suppliers);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Pretty => {
            if cards.is_empty() {
                println!("{}", "No suppliers configured".yellow());
            }
            for card in cards {
                println!("{} {}  {}", card.id.dimmed(), card.title.bold(), card.subtitle);
            }
        }
    }
    Ok(())
}

fn cmd_check_config(config: &GeoPayConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Pretty => {
            println!("{} configuration is valid", "✓".green().bold());
            println!(
                "  map: center {} zoom {}",
                config.map.fallback_center, config.map.zoom
            );
            println!(
                "  location: high_accuracy={} timeout={}ms maximum_age={}ms",
                config.location.enable_high_accuracy,
                config.location.timeout_ms,
                config.location.maximum_age_ms
            );
            println!("  verification radius: {} m", config.verification.radius_m);
            println!("  suppliers: {}", config.suppliers.len());
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn state_line(state: &AcquisitionState) -> String {
    match state {
        AcquisitionState::Idle => "idle".to_string(),
        AcquisitionState::Pending => "pending".yellow().to_string(),
        AcquisitionState::Succeeded { coordinate } => {
            format!("{} {}", "succeeded".green(), coordinate)
        }
        AcquisitionState::Failed { reason } => format!("{} {}", "failed".red(), reason),
    }
}

fn print_report(report: &CaptureReport, radius_m: f64) {
    match &report.status.region {
        Some(StatusRegion::Success { headline, detail }) => {
            println!("{}", headline.green().bold());
            println!("{detail}");
        }
        Some(StatusRegion::Error { message }) => println!("{}", message.red()),
        None => println!("{}", report.status.button_label),
    }

    if let Some(view) = &report.map {
        println!();
        print_view(view);
    }

    if !report.proximity.is_empty() {
        println!();
        println!("{}", format!("Proximity (radius {radius_m} m)").bold());
        for check in &report.proximity {
            let mark = if check.within_radius {
                "✓".green()
            } else {
                "✗".red()
            };
            println!(
                "  {} {} ({}) {:.1} m",
                mark, check.name, check.poi_id, check.distance_m
            );
        }
    }
}

fn print_view(view: &ViewOutput) {
    println!(
        "{} center {} zoom {}",
        "Map".bold(),
        view.center,
        view.zoom
    );
    println!("  tile {}", view.center_tile_url().dimmed());
    for marker in &view.markers {
        let label = if marker.is_user() {
            marker.popup.cyan().bold()
        } else {
            marker.popup.normal()
        };
        println!("  • {} {}", label, marker.position);
    }
    println!("  {}", view.attribution.dimmed());
}
