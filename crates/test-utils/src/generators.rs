//! Test data generators for creating synthetic raw archive files.
//!
//! These generators create predictable, verifiable grids and the compressed
//! staged files the pipeline consumes, so tests never depend on downloaded
//! archive data.

use std::io::Write;
use std::path::Path;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data survives decode, subsetting, and
/// write by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid filled with one constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a zero grid with `fill` placed at the given `(row, col)` cells.
pub fn create_grid_with_fill(
    width: usize,
    height: usize,
    fill: f32,
    positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(row, col) in positions {
        if row < height && col < width {
            data[row * width + col] = fill;
        }
    }
    data
}

/// Ascending coordinate axis: `origin + i * step` for `count` values.
pub fn linear_coords(origin: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| origin + i as f64 * step).collect()
}

/// Encode values as a little-endian flat binary grid.
pub fn encode_le_grid(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Encode values as a big-endian flat binary grid.
pub fn encode_be_grid(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_be_bytes());
    }
    bytes
}

/// Write `bytes` to `path`, gzip-compressed.
pub fn write_gzip(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()?;
    Ok(())
}

/// Write `bytes` to `path`, bzip2-compressed.
pub fn write_bzip2(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()?;
    Ok(())
}
