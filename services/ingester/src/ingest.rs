//! Sequential assembly pipeline.
//!
//! One observation day is fully staged, decoded, and written before the next
//! begins. The output container supports a single writer and the archive is
//! walked in date order, so the loop stays strictly sequential; concurrency
//! lives only in the staging transport.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, instrument, warn};
use zarrs_filesystem::FilesystemStore;

use ctl_parser::{parse_descriptor, GridDescriptor};
use grid_assembly::{
    decode_bytes, resolve_subset, CalendarPolicy, DatasetWriter, SubsetIndices, TimeAxis,
    WriterOptions, CONUS,
};

use crate::config::IngestConfig;
use crate::sources::{create_source, RawFileSource};

/// Counters for one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Declared time-axis length.
    pub time_steps: usize,
    /// Days staged, decoded, and written.
    pub days_written: usize,
    /// Days the archive had no file for.
    pub days_missing: usize,
    /// Days whose staging failed.
    pub days_failed: usize,
}

/// Drives one assembly run: descriptor, time axis, day loop, writer.
pub struct AssemblyPipeline {
    config: IngestConfig,
    source: Box<dyn RawFileSource>,
}

impl AssemblyPipeline {
    /// Create a pipeline with the staging source selected by configuration.
    pub fn new(config: IngestConfig) -> Self {
        let source = create_source(&config.source, config.obs_type);
        Self { config, source }
    }

    /// Run one full assembly.
    ///
    /// Staging failures and archive holes leave their time step at the fill
    /// value and the run continues; decode and write failures abort, since
    /// they mean the descriptor and the archive disagree.
    #[instrument(skip(self), fields(obs_type = ?self.config.obs_type))]
    pub async fn run(&self) -> Result<AssemblyReport> {
        let descriptor = self.load_descriptor().await?;
        info!(
            lon = descriptor.lon_count,
            lat = descriptor.lat_count,
            start = %descriptor.start_date,
            title = %descriptor.title,
            "Parsed descriptor"
        );

        let start_year = self
            .config
            .start_year
            .unwrap_or_else(|| descriptor.start_date.year());
        let end_year = self.config.end_year;

        let time_axis = match self.config.calendar {
            CalendarPolicy::GregorianDaily => {
                TimeAxis::daily(start_year, end_year, self.config.epoch_year)?
            }
            CalendarPolicy::Fixed366 => {
                TimeAxis::fixed_366(start_year, end_year, self.config.epoch_year)?
            }
            CalendarPolicy::GregorianMonthly => {
                return Err(anyhow!("monthly axes are not assembled from daily archives"));
            }
        };

        let lat_full = descriptor.lat_coords();
        let lon_full = descriptor.lon_coords();

        let subset = if self.config.conus_only {
            let indices = resolve_subset(&lat_full, &lon_full, &CONUS)?;
            info!(
                lat_range = ?indices.lat,
                lon_range = ?indices.lon,
                "Restricting output to the continental US box"
            );
            indices
        } else {
            SubsetIndices::full(descriptor.lat_count, descriptor.lon_count)
        };

        std::fs::create_dir_all(&self.config.output_path).with_context(|| {
            format!(
                "creating output directory {}",
                self.config.output_path.display()
            )
        })?;
        let store = FilesystemStore::new(&self.config.output_path)
            .with_context(|| format!("opening store {}", self.config.output_path.display()))?;

        let options = WriterOptions {
            compression: self.config.compression,
            ..Default::default()
        };
        let mut writer = DatasetWriter::open(
            store,
            &descriptor,
            &time_axis,
            &lat_full[subset.lat.clone()],
            &lon_full[subset.lon.clone()],
            &options,
        )?;

        let mut report = AssemblyReport {
            time_steps: time_axis.len(),
            days_written: 0,
            days_missing: 0,
            days_failed: 0,
        };

        for (index, date) in assembly_days(start_year, end_year, self.config.calendar)? {
            match self.source.fetch_day(date).await {
                Ok(Some(bytes)) => {
                    let grid = decode_bytes(&bytes, &descriptor)?;
                    let grid = if self.config.conus_only {
                        grid.crop(subset.lat.clone(), subset.lon.clone())?
                    } else {
                        grid
                    };
                    writer.write_step(index, &grid)?;
                    report.days_written += 1;
                    debug!(date = %date, index, "Wrote time step");
                }
                Ok(None) => {
                    report.days_missing += 1;
                    debug!(date = %date, index, "No raw file for day, step stays fill-valued");
                }
                Err(e) => {
                    report.days_failed += 1;
                    warn!(date = %date, index, error = %e, "Staging failed, step stays fill-valued");
                }
            }
        }

        let summary = writer.close()?;
        info!(
            time_steps = summary.time_steps,
            written = report.days_written,
            missing = report.days_missing,
            failed = report.days_failed,
            "Assembly complete"
        );
        Ok(report)
    }

    /// Load the descriptor from the configured local path, or fetch it from
    /// the staging source.
    async fn load_descriptor(&self) -> Result<GridDescriptor> {
        let prefix = self.config.obs_type.tdef_prefix();
        let text = match &self.config.descriptor_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading descriptor {}", path.display()))?,
            None => self.source.fetch_descriptor().await?,
        };
        Ok(parse_descriptor(&text, prefix)?)
    }
}

/// Observation days for the run, paired with their time-axis indices.
///
/// Under the fixed 366-step convention the slot a leap day would occupy is
/// skipped in non-leap years, leaving that step fill-valued.
fn assembly_days(
    start_year: i32,
    end_year: i32,
    calendar: CalendarPolicy,
) -> Result<Vec<(usize, NaiveDate)>> {
    let mut days = Vec::new();
    match calendar {
        CalendarPolicy::GregorianDaily => {
            let mut index = 0usize;
            for year in start_year..=end_year {
                for date in year_days(year)? {
                    days.push((index, date));
                    index += 1;
                }
            }
        }
        CalendarPolicy::Fixed366 => {
            for (year_no, year) in (start_year..=end_year).enumerate() {
                let base = year_no * 366;
                let leap = year_days(year)?.count() == 366;
                for date in year_days(year)? {
                    let doy = date.ordinal0() as usize;
                    let slot = if leap || doy < 59 { doy } else { doy + 1 };
                    days.push((base + slot, date));
                }
            }
        }
        CalendarPolicy::GregorianMonthly => {
            return Err(anyhow!("monthly axes are not assembled from daily archives"));
        }
    }
    Ok(days)
}

/// Days of one calendar year, January 1st through December 31st.
fn year_days(year: i32) -> Result<impl Iterator<Item = NaiveDate>> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| anyhow!("invalid year {}", year))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| anyhow!("invalid year {}", year))?;
    Ok(start.iter_days().take_while(move |d| *d <= end))
}
