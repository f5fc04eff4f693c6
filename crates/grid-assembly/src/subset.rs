//! Spatial subset resolution over ascending coordinate axes.

use std::ops::Range;

use crate::error::{AssemblyError, Result};

/// Geographic bounding box in the archive's native convention; longitudes
/// run 0-360 degrees east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }
}

/// Continental United States cutout used for regional assemblies.
pub const CONUS: BoundingBox = BoundingBox {
    south: 23.0,
    north: 50.0,
    west: 232.0,
    east: 295.0,
};

/// Index ranges into the full grid covering a bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetIndices {
    pub lat: Range<usize>,
    pub lon: Range<usize>,
}

impl SubsetIndices {
    /// Ranges spanning the whole grid.
    pub fn full(lat_count: usize, lon_count: usize) -> Self {
        Self {
            lat: 0..lat_count,
            lon: 0..lon_count,
        }
    }

    pub fn lat_count(&self) -> usize {
        self.lat.len()
    }

    pub fn lon_count(&self) -> usize {
        self.lon.len()
    }
}

/// Resolve a bounding box to index ranges over the grid's coordinate axes.
///
/// For each axis the lower index is the first coordinate not less than the
/// requested minimum and the upper index is one past the last coordinate not
/// greater than the requested maximum, so the selection never reaches
/// outside the requested box. A box that covers no grid points at all fails
/// with [`AssemblyError::OutOfBounds`].
pub fn resolve_subset(
    lat_coords: &[f64],
    lon_coords: &[f64],
    bbox: &BoundingBox,
) -> Result<SubsetIndices> {
    let lat = axis_range("latitude", lat_coords, bbox.south, bbox.north)?;
    let lon = axis_range("longitude", lon_coords, bbox.west, bbox.east)?;
    Ok(SubsetIndices { lat, lon })
}

fn axis_range(axis: &'static str, coords: &[f64], min: f64, max: f64) -> Result<Range<usize>> {
    let lo = coords.partition_point(|&c| c < min);
    let hi = coords.partition_point(|&c| c <= max);
    if lo >= hi {
        return Err(AssemblyError::OutOfBounds { axis, min, max });
    }
    Ok(lo..hi)
}
