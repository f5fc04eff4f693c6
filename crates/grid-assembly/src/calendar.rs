//! Time-axis construction for the supported calendar conventions.
//!
//! Offsets are integer day counts measured from January 1st of a caller
//! supplied epoch year, matching `days since <epoch>-01-01` time units.
//! Downstream readers dispatch on the `calendar` attribute, so the axis
//! carries its policy alongside the offsets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AssemblyError, Result};

/// Calendar convention used to lay out a time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarPolicy {
    /// One step per calendar month.
    GregorianMonthly,
    /// One step per calendar day, leap days included naturally.
    GregorianDaily,
    /// Exactly 366 steps per year. Non-leap years repeat the Feb-28 offset
    /// in the slot a leap day would occupy, so every year has the same
    /// shape.
    Fixed366,
}

impl CalendarPolicy {
    /// Value of the `calendar` attribute written to the output dataset.
    pub fn attribute_name(&self) -> &'static str {
        match self {
            CalendarPolicy::GregorianMonthly | CalendarPolicy::GregorianDaily => "gregorian",
            CalendarPolicy::Fixed366 => "366_day",
        }
    }
}

/// Ordered day-offsets for the output time dimension.
///
/// Offsets increase strictly except under [`CalendarPolicy::Fixed366`],
/// where non-leap years carry one adjacent duplicate at the Feb-28/Feb-29
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    offsets: Vec<i32>,
    epoch_year: i32,
    policy: CalendarPolicy,
}

impl TimeAxis {
    /// Monthly axis: one offset per month, `total_months` steps starting at
    /// `initial_year`/`initial_month`.
    pub fn monthly(
        initial_year: i32,
        initial_month: u32,
        total_months: usize,
        epoch_year: i32,
    ) -> Result<Self> {
        if !(1..=12).contains(&initial_month) {
            return Err(AssemblyError::invalid_range(format!(
                "initial month {} is not in 1-12",
                initial_month
            )));
        }
        validate_epoch(initial_year, epoch_year)?;
        let epoch = epoch_date(epoch_year)?;

        let mut offsets = Vec::with_capacity(total_months);
        for i in 0..total_months {
            let months = initial_month as usize - 1 + i;
            let year = initial_year + (months / 12) as i32;
            let month = (months % 12) as u32 + 1;
            let first = ymd(year, month, 1)?;
            offsets.push(days_between(first, epoch));
        }

        Ok(Self {
            offsets,
            epoch_year,
            policy: CalendarPolicy::GregorianMonthly,
        })
    }

    /// Daily axis over whole years: January 1st of `initial_year` through
    /// December 31st of `final_year`, one step per day.
    pub fn daily(initial_year: i32, final_year: i32, epoch_year: i32) -> Result<Self> {
        validate_years(initial_year, final_year, epoch_year)?;
        Self::daily_range(
            ymd(initial_year, 1, 1)?,
            ymd(final_year, 12, 31)?,
            epoch_year,
        )
    }

    /// Daily axis over an inclusive date range.
    pub fn daily_range(start: NaiveDate, end: NaiveDate, epoch_year: i32) -> Result<Self> {
        validate_epoch(start.year(), epoch_year)?;
        if end < start {
            return Err(AssemblyError::invalid_range(format!(
                "final date {} is before the initial date {}",
                end, start
            )));
        }
        let epoch = epoch_date(epoch_year)?;

        let first = days_between(start, epoch);
        let total = days_between(end, start) + 1;
        let offsets = (0..total).map(|i| first + i).collect();

        Ok(Self {
            offsets,
            epoch_year,
            policy: CalendarPolicy::GregorianDaily,
        })
    }

    /// Fixed 366-step axis over whole years.
    ///
    /// Leap years map one slot per real day. Non-leap years write the Feb-28
    /// offset into both slot 58 and slot 59, then resume with Mar-1 in slot
    /// 60, so the duplicate pair is the only non-increasing step.
    pub fn fixed_366(initial_year: i32, final_year: i32, epoch_year: i32) -> Result<Self> {
        validate_years(initial_year, final_year, epoch_year)?;
        let epoch = epoch_date(epoch_year)?;

        let year_count = (final_year - initial_year + 1) as usize;
        let mut offsets = Vec::with_capacity(year_count * 366);
        let mut year_start = days_between(ymd(initial_year, 1, 1)?, epoch);

        for year in initial_year..=final_year {
            if is_leap_year(year) {
                for step in 0..366 {
                    offsets.push(year_start + step);
                }
                year_start += 366;
            } else {
                for step in 0..366 {
                    let offset = match step {
                        0..=58 => year_start + step,
                        59 => year_start + 58,
                        _ => year_start + step - 1,
                    };
                    offsets.push(offset);
                }
                year_start += 365;
            }
        }

        Ok(Self {
            offsets,
            epoch_year,
            policy: CalendarPolicy::Fixed366,
        })
    }

    /// Day offsets from the epoch, in time-dimension order.
    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn policy(&self) -> CalendarPolicy {
        self.policy
    }

    pub fn epoch_year(&self) -> i32 {
        self.epoch_year
    }

    /// `units` attribute value for the time coordinate.
    pub fn units(&self) -> String {
        format!("days since {}-01-01", self.epoch_year)
    }
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AssemblyError::invalid_range(format!(
            "invalid calendar date {}-{:02}-{:02}",
            year, month, day
        ))
    })
}

fn epoch_date(epoch_year: i32) -> Result<NaiveDate> {
    ymd(epoch_year, 1, 1)
}

fn days_between(date: NaiveDate, epoch: NaiveDate) -> i32 {
    (date - epoch).num_days() as i32
}

fn validate_epoch(initial_year: i32, epoch_year: i32) -> Result<()> {
    if initial_year < epoch_year {
        return Err(AssemblyError::invalid_range(format!(
            "initial year {} is before the units epoch year {}",
            initial_year, epoch_year
        )));
    }
    Ok(())
}

fn validate_years(initial_year: i32, final_year: i32, epoch_year: i32) -> Result<()> {
    validate_epoch(initial_year, epoch_year)?;
    if final_year < initial_year {
        return Err(AssemblyError::invalid_range(format!(
            "final year {} is before the initial year {}",
            final_year, initial_year
        )));
    }
    Ok(())
}
