//! Parsed grid metadata shared by every raw file in an archive.

use chrono::NaiveDate;

/// Byte order of the raw binary grids described by a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// Layout of the TDEF start-date token.
///
/// Gauge-adjusted archives publish descriptors whose start-date token carries
/// a leading hour-of-day marker (`00z01jan1998`); raw archives use the bare
/// date (`01jan1998`). The caller selects the mode from the observation type
/// being ingested; it is never sniffed from the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TdefPrefix {
    /// Bare `%d%b%Y` date token.
    #[default]
    None,
    /// A 3-character hour marker precedes the date token.
    Hour,
}

/// Grid metadata parsed from a CTL descriptor.
///
/// Built once per run by [`crate::parse_descriptor`] and treated as immutable
/// afterwards: every raw daily file in the archive is decoded against the
/// same descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    /// Number of longitude columns (XDEF count).
    pub lon_count: usize,
    /// First longitude value in degrees east (0-360 convention).
    pub lon_origin: f64,
    /// Longitude step in degrees.
    pub lon_increment: f64,
    /// Number of latitude rows (YDEF count).
    pub lat_count: usize,
    /// First latitude value in degrees north.
    pub lat_origin: f64,
    /// Latitude step in degrees.
    pub lat_increment: f64,
    /// Byte order of the raw binary files.
    pub byte_order: ByteOrder,
    /// Sentinel marking missing observations in the raw files.
    pub fill_value: f32,
    /// First day covered by the archive (TDEF start date).
    pub start_date: NaiveDate,
    /// TITLE directive text.
    pub title: String,
    /// Free text following the data-variable declaration.
    pub variable_description: String,
}

impl GridDescriptor {
    /// Flat element count of one raw grid file.
    pub fn element_count(&self) -> usize {
        self.lon_count * self.lat_count
    }

    /// Longitude coordinate values.
    ///
    /// Each value is computed from the origin and index so long axes do not
    /// accumulate floating-point drift.
    pub fn lon_coords(&self) -> Vec<f64> {
        (0..self.lon_count)
            .map(|i| self.lon_origin + i as f64 * self.lon_increment)
            .collect()
    }

    /// Latitude coordinate values.
    pub fn lat_coords(&self) -> Vec<f64> {
        (0..self.lat_count)
            .map(|i| self.lat_origin + i as f64 * self.lat_increment)
            .collect()
    }
}
