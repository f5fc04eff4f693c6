//! Zarr V3 dataset writer for assembled daily time series.
//!
//! The output hierarchy is a root group holding three coordinate arrays and
//! the data variable:
//!
//! ```text
//! /        group, `title` attribute from the descriptor
//! /time    i32, `days since <epoch>-01-01` offsets
//! /lat     f32, degrees_north
//! /lon     f32, degrees_east
//! /prcp    f32, shape [time, lat, lon], NaN fill
//! ```
//!
//! The data variable is chunked `[1, lat, lon]` so every daily write lands
//! in exactly one chunk. Time steps that are never written stay at the fill
//! value, which is how archive gaps are represented; a partially-filled
//! dataset is a valid terminal state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{Array, ArrayBuilder, ChunkGrid, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::GroupBuilder;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};

use ctl_parser::GridDescriptor;

use crate::calendar::TimeAxis;
use crate::decode::RawGrid;
use crate::error::{AssemblyError, Result};

/// Compression applied to data-variable chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Chunks are stored uncompressed.
    #[default]
    None,
    /// Blosc with LZ4.
    Lz4,
    /// Blosc with Zstd.
    Zstd,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Lz4 => "lz4",
            Compression::Zstd => "zstd",
        }
    }
}

/// Options for dataset creation.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Chunk compression for the data variable.
    pub compression: Compression,
    /// Blosc compression level, ignored when compression is off.
    pub compression_level: u8,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression: Compression::None,
            compression_level: 5,
        }
    }
}

/// Counters reported when a dataset is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Declared time-axis length.
    pub time_steps: usize,
    /// Number of write calls that landed.
    pub steps_written: usize,
}

/// Owns the output container lifecycle: creates the hierarchy and coordinate
/// values up front, accepts per-step grid writes in any order, and reports a
/// summary on close.
pub struct DatasetWriter<S: ReadableStorageTraits + WritableStorageTraits + 'static> {
    prcp: Array<S>,
    time_len: usize,
    lat_count: usize,
    lon_count: usize,
    steps_written: usize,
}

impl<S: ReadableStorageTraits + WritableStorageTraits + 'static> DatasetWriter<S> {
    /// Create the dataset hierarchy and write all coordinate values.
    ///
    /// `lat_coords` and `lon_coords` are the output coordinates, already
    /// restricted to any requested spatial subset; grids passed to
    /// [`DatasetWriter::write_step`] must match their lengths.
    pub fn open(
        storage: S,
        descriptor: &GridDescriptor,
        time_axis: &TimeAxis,
        lat_coords: &[f64],
        lon_coords: &[f64],
        options: &WriterOptions,
    ) -> Result<Self> {
        let store = Arc::new(storage);

        let n_time = time_axis.len() as u64;
        let n_lat = lat_coords.len() as u64;
        let n_lon = lon_coords.len() as u64;

        let mut group_attrs = serde_json::Map::new();
        group_attrs.insert("title".to_string(), serde_json::json!(descriptor.title));
        let group = GroupBuilder::new()
            .attributes(group_attrs)
            .build(store.clone(), "/")
            .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;
        group
            .store_metadata()
            .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;

        let mut time_attrs = serde_json::Map::new();
        time_attrs.insert("units".to_string(), serde_json::json!(time_axis.units()));
        time_attrs.insert(
            "calendar".to_string(),
            serde_json::json!(time_axis.policy().attribute_name()),
        );
        time_attrs.insert("long_name".to_string(), serde_json::json!("Time"));
        let time_array = ArrayBuilder::new(
            vec![n_time],
            DataType::Int32,
            chunk_grid(vec![n_time.max(1)])?,
            FillValue::from(-1i32),
        )
        .attributes(time_attrs)
        .dimension_names(["time"].into())
        .build(store.clone(), "/time")
        .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;
        time_array
            .store_metadata()
            .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;
        if !time_axis.is_empty() {
            let subset = ArraySubset::new_with_start_shape(vec![0], vec![n_time])
                .map_err(|e| AssemblyError::storage_error(e.to_string()))?;
            time_array
                .store_array_subset_elements(&subset, time_axis.offsets())
                .map_err(|e| AssemblyError::storage_error(e.to_string()))?;
        }

        write_coordinate(&store, "/lat", "Latitude", "degrees_north", lat_coords)?;
        write_coordinate(&store, "/lon", "Longitude", "degrees_east", lon_coords)?;

        let mut prcp_attrs = serde_json::Map::new();
        prcp_attrs.insert("units".to_string(), serde_json::json!("mm"));
        prcp_attrs.insert(
            "standard_name".to_string(),
            serde_json::json!("precipitation"),
        );
        prcp_attrs.insert("long_name".to_string(), serde_json::json!("Precipitation"));
        prcp_attrs.insert(
            "description".to_string(),
            serde_json::json!(descriptor.title),
        );

        let mut binding = ArrayBuilder::new(
            vec![n_time, n_lat, n_lon],
            DataType::Float32,
            chunk_grid(vec![1, n_lat.max(1), n_lon.max(1)])?,
            FillValue::from(f32::NAN),
        );
        let mut builder = binding.attributes(prcp_attrs);
        builder = builder.dimension_names(["time", "lat", "lon"].into());
        if options.compression != Compression::None {
            let codec = create_compression_codec(options)?;
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }
        let prcp = builder
            .build(store.clone(), "/prcp")
            .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;
        prcp.store_metadata()
            .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;

        debug!(
            time_steps = n_time,
            lat = n_lat,
            lon = n_lon,
            compression = options.compression.as_str(),
            "Created output dataset"
        );

        Ok(Self {
            prcp,
            time_len: time_axis.len(),
            lat_count: lat_coords.len(),
            lon_count: lon_coords.len(),
            steps_written: 0,
        })
    }

    /// Write one decoded grid at the given time index.
    ///
    /// Writes may arrive in any order and a given index may be written at
    /// most the declared shape allows; indices never written stay at the
    /// fill value.
    pub fn write_step(&mut self, index: usize, grid: &RawGrid) -> Result<()> {
        let (lat_count, lon_count) = grid.shape();
        if lat_count != self.lat_count || lon_count != self.lon_count {
            return Err(AssemblyError::shape_mismatch(
                format!("{}x{}", self.lat_count, self.lon_count),
                format!("{}x{}", lat_count, lon_count),
            ));
        }
        if index >= self.time_len {
            return Err(AssemblyError::shape_mismatch(
                format!("time index below {}", self.time_len),
                format!("time index {}", index),
            ));
        }

        // one chunk per time step, so this writes exactly one chunk
        self.prcp
            .store_chunk_elements(&[index as u64, 0, 0], grid.values())
            .map_err(|e| AssemblyError::storage_error(e.to_string()))?;
        self.steps_written += 1;
        Ok(())
    }

    /// Declared time-axis length.
    pub fn time_len(&self) -> usize {
        self.time_len
    }

    /// Finish the run and report counters.
    pub fn close(self) -> Result<WriteSummary> {
        let summary = WriteSummary {
            time_steps: self.time_len,
            steps_written: self.steps_written,
        };
        debug!(
            time_steps = summary.time_steps,
            steps_written = summary.steps_written,
            "Closed output dataset"
        );
        Ok(summary)
    }
}

/// Create a 1-D float coordinate array and store its values.
fn write_coordinate<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
    store: &Arc<S>,
    path: &str,
    long_name: &str,
    units: &str,
    coords: &[f64],
) -> Result<()> {
    let mut attrs = serde_json::Map::new();
    attrs.insert("units".to_string(), serde_json::json!(units));
    attrs.insert("long_name".to_string(), serde_json::json!(long_name));

    let n = coords.len() as u64;
    let name = match path.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => path.to_string(),
    };

    let array = ArrayBuilder::new(
        vec![n],
        DataType::Float32,
        chunk_grid(vec![n.max(1)])?,
        FillValue::from(f32::NAN),
    )
    .attributes(attrs)
    .dimension_names([name.as_str()].into())
    .build(store.clone(), path)
    .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;
    array
        .store_metadata()
        .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;

    if !coords.is_empty() {
        let values: Vec<f32> = coords.iter().map(|&v| v as f32).collect();
        let subset = ArraySubset::new_with_start_shape(vec![0], vec![n])
            .map_err(|e| AssemblyError::storage_error(e.to_string()))?;
        array
            .store_array_subset_elements(&subset, &values)
            .map_err(|e| AssemblyError::storage_error(e.to_string()))?;
    }

    Ok(())
}

fn chunk_grid(shape: Vec<u64>) -> Result<ChunkGrid> {
    shape
        .try_into()
        .map_err(|e| AssemblyError::zarr_error(format!("{:?}", e)))
}

/// Create the Blosc codec selected by the options.
fn create_compression_codec(
    options: &WriterOptions,
) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
    let level = BloscCompressionLevel::try_from(options.compression_level)
        .map_err(|_| AssemblyError::zarr_error("invalid compression level"))?;

    let compressor = match options.compression {
        Compression::None => return Err(AssemblyError::zarr_error("no compression configured")),
        Compression::Lz4 => BloscCompressor::LZ4,
        Compression::Zstd => BloscCompressor::Zstd,
    };

    // typesize drives the byte shuffle; f32 elements are 4 bytes wide
    let codec = BloscCodec::new(compressor, level, None, BloscShuffleMode::Shuffle, Some(4))
        .map_err(|e| AssemblyError::zarr_error(e.to_string()))?;

    Ok(Arc::new(codec))
}
