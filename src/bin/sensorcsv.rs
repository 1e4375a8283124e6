// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Sensorcsv CLI
//!
//! Export the sensor streams of device recordings to CSV files.
//!
//! ## Usage
//!
//! ```sh
//! # Export every supported stream beside the recording
//! sensorcsv walk.mcap
//!
//! # Only barometer and Wi-Fi, into another directory
//! sensorcsv --only Baro,Wifi -o csv/ walk.mcap run.mcap
//!
//! # Show what would be written
//! sensorcsv --list walk.mcap
//! ```

mod common;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context as _;
use clap::{CommandFactory, Parser};
use common::{plural, ProgressBar, Result};
use sensorcsv::{open_source, ExportConfig, FamilyTag, RouteDecision, RunController, StreamRouter};

/// Sensorcsv - export recording sensor streams to CSV
///
/// Writes one CSV file per IMU, magnetometer, Wi-Fi, Bluetooth and barometer
/// stream, named `<recording>_<Tag>_<index>.csv`.
#[derive(Parser, Clone)]
#[command(name = "sensorcsv")]
#[command(about = "Export recording sensor streams to CSV", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Recording files to export
    files: Vec<PathBuf>,

    /// Directory for the CSV files (default: beside each recording)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Only export these families (comma-separated: IMU,Magnet,Wifi,BLE,Baro)
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    only: Vec<FamilyTag>,

    /// Quote text cells containing commas, quotes or line breaks
    #[arg(long)]
    quote: bool,

    /// Load export options from a TOML file (flags override it)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List streams and planned outputs without writing anything
    #[arg(long)]
    list: bool,

    /// Show a progress bar over the input files
    #[arg(long)]
    progress: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else {
        let default_level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("failed to install log subscriber")
}

/// Merge the config file, if any, with command-line flags.
fn load_config(cli: &Cli) -> Result<ExportConfig> {
    let mut config = match &cli.config {
        Some(path) => ExportConfig::from_file(path)
            .with_context(|| format!("invalid config file {}", path.display()))?,
        None => ExportConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if !cli.only.is_empty() {
        config.families = Some(cli.only.clone());
    }
    if cli.quote {
        config.quote_text = true;
    }
    Ok(config)
}

/// Print the streams of one recording and where they would go.
fn list_file(path: &Path, config: &ExportConfig) {
    println!("{}", path.display());

    let source = match open_source(path) {
        Ok(source) => source,
        Err(e) => {
            println!("  error: {e}");
            return;
        }
    };

    let router = StreamRouter::new(config);
    for plan in router.plan(path, &source.streams()) {
        let stream = &plan.stream;
        let target = match &plan.decision {
            RouteDecision::Export { path, .. } => format!("-> {}", path.display()),
            RouteDecision::Unknown => "skipped (unsupported sensor)".to_string(),
            RouteDecision::Filtered(tag) => format!("skipped ({tag} not selected)"),
        };
        println!(
            "  {:<8} {:<22} {:>10}  {target}",
            stream.id.to_string(),
            stream.id.sensor.name(),
            plural(stream.record_count, "record"),
        );
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if cli.list {
        for path in &cli.files {
            list_file(path, &config);
        }
        return Ok(());
    }

    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    }

    let progress = ProgressBar::new(cli.files.len() as u64, cli.progress);
    let controller = RunController::new(config);
    let summary = controller.run_with(&cli.files, |result| {
        progress.set_message(result.input.display().to_string());
        progress.inc();
    });

    progress.finish_with_message(format!(
        "{} of {} exported, {}",
        summary.files_succeeded(),
        plural(summary.files.len() as u64, "file"),
        plural(summary.rows_written(), "row"),
    ));
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.files.is_empty() {
        eprintln!("{}", Cli::command().render_usage());
        process::exit(1);
    }

    if let Err(e) = init_logging(&cli) {
        eprintln!("Warning: {e}");
    }

    // Per-file failures are logged; only setup errors change the exit code.
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
