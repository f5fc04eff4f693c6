//! Raw binary grid decoding.
//!
//! Raw archive files are flat sequences of 4-byte IEEE-754 floats with no
//! header or framing; the descriptor supplies the byte order, the
//! missing-value sentinel, and the expected element count. Cells equal to
//! the sentinel decode to NaN so missing observations stay distinguishable
//! from a measured zero.

use std::ops::Range;
use std::path::Path;

use ctl_parser::{ByteOrder, GridDescriptor};

use crate::error::{AssemblyError, Result};

/// One decoded raw file: a row-major `(lat, lon)` grid with missing cells
/// already converted to NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGrid {
    values: Vec<f32>,
    lat_count: usize,
    lon_count: usize,
}

impl RawGrid {
    /// Assemble a grid from already-decoded values.
    pub fn from_values(values: Vec<f32>, lat_count: usize, lon_count: usize) -> Result<Self> {
        let expected = lat_count * lon_count;
        if values.len() != expected {
            return Err(AssemblyError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            lat_count,
            lon_count,
        })
    }

    /// Cell values in row-major order, latitude rows first.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// `(lat_count, lon_count)` shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.lat_count, self.lon_count)
    }

    /// Value at a `(lat, lon)` index pair.
    pub fn get(&self, lat_idx: usize, lon_idx: usize) -> f32 {
        self.values[lat_idx * self.lon_count + lon_idx]
    }

    /// Copy out the cells covered by the given index ranges.
    pub fn crop(&self, lat_range: Range<usize>, lon_range: Range<usize>) -> Result<RawGrid> {
        if lat_range.end > self.lat_count || lon_range.end > self.lon_count {
            return Err(AssemblyError::shape_mismatch(
                format!("within {}x{}", self.lat_count, self.lon_count),
                format!("lat {:?} lon {:?}", lat_range, lon_range),
            ));
        }

        let mut values = Vec::with_capacity(lat_range.len() * lon_range.len());
        for lat_idx in lat_range.clone() {
            let row = lat_idx * self.lon_count;
            values.extend_from_slice(&self.values[row + lon_range.start..row + lon_range.end]);
        }

        Ok(RawGrid {
            values,
            lat_count: lat_range.len(),
            lon_count: lon_range.len(),
        })
    }
}

/// Decode one raw file's bytes against its descriptor.
///
/// Fails with [`AssemblyError::SizeMismatch`] when the byte length does not
/// describe exactly `lat_count * lon_count` 4-byte elements.
pub fn decode_bytes(bytes: &[u8], descriptor: &GridDescriptor) -> Result<RawGrid> {
    let expected = descriptor.element_count();
    if bytes.len() % 4 != 0 || bytes.len() / 4 != expected {
        return Err(AssemblyError::SizeMismatch {
            expected,
            actual: bytes.len() / 4,
        });
    }

    let mut values = Vec::with_capacity(expected);
    for chunk in bytes.chunks_exact(4) {
        let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let value = match descriptor.byte_order {
            ByteOrder::LittleEndian => f32::from_le_bytes(raw),
            ByteOrder::BigEndian => f32::from_be_bytes(raw),
        };
        // sentinel comparison is exact; zero is a valid observation
        values.push(if value == descriptor.fill_value {
            f32::NAN
        } else {
            value
        });
    }

    RawGrid::from_values(values, descriptor.lat_count, descriptor.lon_count)
}

/// Read and decode a raw file from disk.
pub fn decode_file(path: impl AsRef<Path>, descriptor: &GridDescriptor) -> Result<RawGrid> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes, descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn descriptor(lat_count: usize, lon_count: usize, byte_order: ByteOrder) -> GridDescriptor {
        GridDescriptor {
            lon_count,
            lon_origin: 0.125,
            lon_increment: 0.25,
            lat_count,
            lat_origin: -59.875,
            lat_increment: 0.25,
            byte_order,
            fill_value: -999.0,
            start_date: NaiveDate::from_ymd_opt(1998, 1, 1).unwrap(),
            title: String::new(),
            variable_description: String::new(),
        }
    }

    fn encode(values: &[f32], byte_order: ByteOrder) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            match byte_order {
                ByteOrder::LittleEndian => bytes.extend_from_slice(&v.to_le_bytes()),
                ByteOrder::BigEndian => bytes.extend_from_slice(&v.to_be_bytes()),
            }
        }
        bytes
    }

    #[test]
    fn test_decodes_little_endian_grid() {
        let values = [0.0, 1.5, 2.5, 3.0, 4.25, 5.75];
        let bytes = encode(&values, ByteOrder::LittleEndian);

        let grid = decode_bytes(&bytes, &descriptor(2, 3, ByteOrder::LittleEndian)).unwrap();

        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.values(), &values);
        assert_eq!(grid.get(1, 0), 3.0);
    }

    #[test]
    fn test_decodes_big_endian_grid() {
        let values = [0.0, 1.5, 2.5, 3.0];
        let bytes = encode(&values, ByteOrder::BigEndian);

        let grid = decode_bytes(&bytes, &descriptor(2, 2, ByteOrder::BigEndian)).unwrap();

        assert_eq!(grid.values(), &values);
    }

    #[test]
    fn test_byte_order_swap_is_an_involution() {
        let values = [12.5f32, -0.75, 1.0e-3, 8_123_456.0];
        let le = encode(&values, ByteOrder::LittleEndian);
        let be = encode(&values, ByteOrder::BigEndian);

        assert_ne!(le, be);

        let from_le = decode_bytes(&le, &descriptor(2, 2, ByteOrder::LittleEndian)).unwrap();
        let from_be = decode_bytes(&be, &descriptor(2, 2, ByteOrder::BigEndian)).unwrap();

        for (a, b) in from_le.values().iter().zip(from_be.values()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_fill_sentinel_becomes_nan() {
        let values = [0.0, -999.0, 2.5, -999.0];
        let bytes = encode(&values, ByteOrder::LittleEndian);

        let grid = decode_bytes(&bytes, &descriptor(2, 2, ByteOrder::LittleEndian)).unwrap();

        assert_eq!(grid.values()[0], 0.0);
        assert!(grid.values()[1].is_nan());
        assert_eq!(grid.values()[2], 2.5);
        assert!(grid.values()[3].is_nan());
    }

    #[test]
    fn test_zero_is_a_valid_observation() {
        // zero rainfall must survive decoding, only the sentinel maps to NaN
        let values = [0.0, 0.0, 0.0, 0.0];
        let bytes = encode(&values, ByteOrder::LittleEndian);

        let grid = decode_bytes(&bytes, &descriptor(2, 2, ByteOrder::LittleEndian)).unwrap();

        assert!(grid.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_near_sentinel_values_survive() {
        let values = [-998.999_94, -999.000_06];
        let bytes = encode(&values, ByteOrder::LittleEndian);

        let grid = decode_bytes(&bytes, &descriptor(1, 2, ByteOrder::LittleEndian)).unwrap();

        assert!(grid.values().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_short_file_is_rejected() {
        let bytes = encode(&[1.0, 2.0], ByteOrder::LittleEndian);
        let err = decode_bytes(&bytes, &descriptor(2, 2, ByteOrder::LittleEndian)).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::SizeMismatch {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_ragged_length_is_rejected() {
        let mut bytes = encode(&[1.0, 2.0, 3.0, 4.0], ByteOrder::LittleEndian);
        bytes.push(0xFF);
        assert!(decode_bytes(&bytes, &descriptor(2, 2, ByteOrder::LittleEndian)).is_err());
    }

    #[test]
    fn test_crop_extracts_sub_grid() {
        let values: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let grid = RawGrid::from_values(values, 3, 4).unwrap();

        let cropped = grid.crop(1..3, 1..3).unwrap();

        assert_eq!(cropped.shape(), (2, 2));
        assert_eq!(cropped.values(), &[5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn test_crop_beyond_extent_is_rejected() {
        let grid = RawGrid::from_values(vec![0.0; 12], 3, 4).unwrap();
        assert!(grid.crop(0..4, 0..4).is_err());
        assert!(grid.crop(0..3, 0..5).is_err());
    }
}
