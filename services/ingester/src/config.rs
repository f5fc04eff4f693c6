//! Ingester configuration.

use std::env;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use ctl_parser::TdefPrefix;
use grid_assembly::{CalendarPolicy, Compression};

/// Default HTTPS mirror for the archive.
pub const DEFAULT_BASE_URL: &str = "https://ftp.cpc.ncep.noaa.gov/precip";

/// Mirror base URL, overridable through the environment.
pub fn base_url_from_env() -> String {
    env::var("CMORPH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// Observation type being ingested.
///
/// The type selects the archive directory layout, the per-era compression
/// codec, and how the descriptor's TDEF start-date token is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ObsType {
    /// Satellite-only precipitation estimates.
    Raw,
    /// Gauge-adjusted (bias-corrected) estimates.
    Adjusted,
}

impl ObsType {
    /// Gauge-adjusted descriptors prepend an hour marker to the TDEF date.
    pub fn tdef_prefix(&self) -> TdefPrefix {
        match self {
            ObsType::Raw => TdefPrefix::None,
            ObsType::Adjusted => TdefPrefix::Hour,
        }
    }
}

/// Calendar convention selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CalendarMode {
    /// Real calendar days, leap days included.
    Gregorian,
    /// 366 slots per year, with the Feb-29 slot fill-valued in non-leap years.
    Fixed366,
}

impl From<CalendarMode> for CalendarPolicy {
    fn from(mode: CalendarMode) -> Self {
        match mode {
            CalendarMode::Gregorian => CalendarPolicy::GregorianDaily,
            CalendarMode::Fixed366 => CalendarPolicy::Fixed366,
        }
    }
}

/// Chunk compression selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    None,
    Lz4,
    Zstd,
}

impl From<CompressionArg> for Compression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => Compression::None,
            CompressionArg::Lz4 => Compression::Lz4,
            CompressionArg::Zstd => Compression::Zstd,
        }
    }
}

/// Where raw daily files are staged from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataSource {
    /// Download from the archive's HTTPS mirror.
    Http { base_url: String },

    /// Read already-staged files from a local directory.
    LocalDir { path: PathBuf },
}

/// Runtime configuration for one assembly run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Local CTL descriptor path; fetched from the source when absent.
    pub descriptor_path: Option<PathBuf>,

    /// Output dataset directory.
    pub output_path: PathBuf,

    /// Raw-file staging source.
    pub source: DataSource,

    /// Observation type.
    pub obs_type: ObsType,

    /// First year to assemble; descriptor start year when absent.
    pub start_year: Option<i32>,

    /// Last year to assemble (inclusive).
    pub end_year: i32,

    /// Epoch year for the `days since` time units.
    pub epoch_year: i32,

    /// Time-axis calendar convention.
    pub calendar: CalendarPolicy,

    /// Restrict the output to the continental US box.
    pub conus_only: bool,

    /// Chunk compression for the data variable.
    pub compression: Compression,
}
