//! Assembly of daily binary precipitation archives into Zarr datasets.
//!
//! This crate owns the core of the ingest pipeline: calendar-correct time
//! axes ([`calendar`]), raw binary decoding with missing-value handling
//! ([`decode`]), bounding-box index resolution over coordinate axes
//! ([`subset`]), and the Zarr V3 dataset writer ([`writer`]). Descriptor
//! parsing lives in the `ctl-parser` crate; everything here consumes its
//! [`ctl_parser::GridDescriptor`].

pub mod calendar;
pub mod decode;
pub mod error;
pub mod subset;
pub mod writer;

pub use calendar::{CalendarPolicy, TimeAxis};
pub use decode::{decode_bytes, decode_file, RawGrid};
pub use error::{AssemblyError, Result};
pub use subset::{resolve_subset, BoundingBox, SubsetIndices, CONUS};
pub use writer::{Compression, DatasetWriter, WriteSummary, WriterOptions};
