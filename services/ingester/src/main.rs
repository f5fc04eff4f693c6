//! CMORPH precipitation assembler.
//!
//! Stages daily binary CMORPH files from the CPC archive mirror (or a
//! directory of already-staged files), decodes them against the GrADS
//! descriptor, and assembles them into a single Zarr time-series dataset.

mod config;
mod ingest;
mod sources;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{
    base_url_from_env, CalendarMode, CompressionArg, DataSource, IngestConfig, ObsType,
};
use ingest::AssemblyPipeline;

#[derive(Parser, Debug)]
#[command(name = "cmorph-ingester")]
#[command(about = "Assemble daily binary CMORPH files into a Zarr dataset")]
struct Args {
    /// Grid descriptor file (default: fetch the CTL from the data source)
    #[arg(short, long)]
    descriptor: Option<PathBuf>,

    /// Output dataset directory
    #[arg(short, long)]
    out: PathBuf,

    /// Read raw files from a staged local directory instead of HTTP
    #[arg(long)]
    staged_dir: Option<PathBuf>,

    /// Observation type to assemble
    #[arg(long, value_enum, default_value_t = ObsType::Raw)]
    obs_type: ObsType,

    /// First year to assemble (default: the descriptor's start year)
    #[arg(long)]
    start_year: Option<i32>,

    /// Last year to assemble, inclusive
    #[arg(long)]
    end_year: i32,

    /// Epoch year for time-axis offsets
    #[arg(long, default_value = "1900")]
    epoch_year: i32,

    /// Time axis convention
    #[arg(long, value_enum, default_value_t = CalendarMode::Gregorian)]
    calendar: CalendarMode,

    /// Restrict output to the continental US box
    #[arg(long)]
    conus: bool,

    /// Chunk compression for the data variable
    #[arg(long, value_enum, default_value_t = CompressionArg::None)]
    compression: CompressionArg,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting CMORPH assembler");

    let config = build_config(&args);
    info!(
        obs_type = ?config.obs_type,
        end_year = config.end_year,
        output = %config.output_path.display(),
        "Loaded configuration"
    );

    let pipeline = AssemblyPipeline::new(config);
    let report = pipeline.run().await?;

    info!(
        time_steps = report.time_steps,
        written = report.days_written,
        missing = report.days_missing,
        failed = report.days_failed,
        "Assembler finished"
    );

    Ok(())
}

fn build_config(args: &Args) -> IngestConfig {
    let source = match &args.staged_dir {
        Some(dir) => DataSource::LocalDir { path: dir.clone() },
        None => DataSource::Http {
            base_url: base_url_from_env(),
        },
    };

    IngestConfig {
        descriptor_path: args.descriptor.clone(),
        output_path: args.out.clone(),
        source,
        obs_type: args.obs_type,
        start_year: args.start_year,
        end_year: args.end_year,
        epoch_year: args.epoch_year,
        calendar: args.calendar.into(),
        conus_only: args.conus,
        compression: args.compression.into(),
    }
}
