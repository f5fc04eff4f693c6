//! Integration test: assemble a small daily archive end to end and read the
//! dataset back with a plain Zarr reader.

use std::sync::Arc;

use chrono::NaiveDate;
use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

use ctl_parser::{parse_descriptor, TdefPrefix};
use grid_assembly::{
    decode_bytes, resolve_subset, DatasetWriter, TimeAxis, WriterOptions, CONUS,
};
use test_utils::{
    create_constant_grid, create_test_grid, encode_le_grid, CONUS_SPAN_DESCRIPTOR,
    TINY_DESCRIPTOR,
};

fn read_f32(
    dir: &std::path::Path,
    path: &str,
    subset: &ArraySubset,
) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let store = Arc::new(FilesystemStore::new(dir)?);
    let array = Array::open(store, path)?;
    Ok(array.retrieve_array_subset_elements(subset)?)
}

#[test]
fn test_three_day_assembly_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let descriptor = parse_descriptor(TINY_DESCRIPTOR, TdefPrefix::None)?;
    let axis = TimeAxis::daily_range(
        NaiveDate::from_ymd_opt(1998, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(1998, 1, 3).unwrap(),
        1998,
    )?;

    let dir = tempfile::tempdir()?;
    let store = FilesystemStore::new(dir.path())?;
    let mut writer = DatasetWriter::open(
        store,
        &descriptor,
        &axis,
        &descriptor.lat_coords(),
        &descriptor.lon_coords(),
        &WriterOptions::default(),
    )?;

    // day 1: patterned values, day 2: entirely missing, day 3: one missing cell
    let day1 = create_test_grid(4, 3);
    let day2 = create_constant_grid(4, 3, -999.0);
    let mut day3 = create_test_grid(4, 3);
    day3[7] = -999.0;

    for (index, values) in [&day1, &day2, &day3].into_iter().enumerate() {
        let bytes = encode_le_grid(values);
        let grid = decode_bytes(&bytes, &descriptor)?;
        writer.write_step(index, &grid)?;
    }

    let summary = writer.close()?;
    assert_eq!(summary.time_steps, 3);
    assert_eq!(summary.steps_written, 3);

    // time axis is the three requested days
    let store = Arc::new(FilesystemStore::new(dir.path())?);
    let time = Array::open(store, "/time")?;
    let offsets: Vec<i32> = time.retrieve_array_subset_elements(&time.subset_all())?;
    assert_eq!(offsets, vec![0, 1, 2]);

    // day 1 survives bit-exact
    let step = ArraySubset::new_with_start_shape(vec![0, 0, 0], vec![1, 3, 4])?;
    assert_eq!(read_f32(dir.path(), "/prcp", &step)?, day1);

    // the all-missing day reads back as NaN, not zero
    let step = ArraySubset::new_with_start_shape(vec![1, 0, 0], vec![1, 3, 4])?;
    assert!(read_f32(dir.path(), "/prcp", &step)?
        .iter()
        .all(|v| v.is_nan()));

    // day 3 keeps measured cells and masks the single missing one
    let step = ArraySubset::new_with_start_shape(vec![2, 0, 0], vec![1, 3, 4])?;
    let values = read_f32(dir.path(), "/prcp", &step)?;
    assert!(values[7].is_nan());
    assert_eq!(values[0], day3[0]);
    assert_eq!(values[11], day3[11]);

    println!("Three-day assembly round trip verified");
    Ok(())
}

#[test]
fn test_unwritten_steps_stay_at_fill() -> Result<(), Box<dyn std::error::Error>> {
    let descriptor = parse_descriptor(TINY_DESCRIPTOR, TdefPrefix::None)?;
    let axis = TimeAxis::daily_range(
        NaiveDate::from_ymd_opt(1998, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(1998, 1, 5).unwrap(),
        1998,
    )?;

    let dir = tempfile::tempdir()?;
    let store = FilesystemStore::new(dir.path())?;
    let mut writer = DatasetWriter::open(
        store,
        &descriptor,
        &axis,
        &descriptor.lat_coords(),
        &descriptor.lon_coords(),
        &WriterOptions::default(),
    )?;

    // write days 1 and 4, leaving a two-day hole and a trailing gap
    let values = create_test_grid(4, 3);
    let grid = decode_bytes(&encode_le_grid(&values), &descriptor)?;
    writer.write_step(0, &grid)?;
    writer.write_step(3, &grid)?;

    let summary = writer.close()?;
    assert_eq!(summary.steps_written, 2);

    for missing in [1u64, 2, 4] {
        let step = ArraySubset::new_with_start_shape(vec![missing, 0, 0], vec![1, 3, 4])?;
        assert!(read_f32(dir.path(), "/prcp", &step)?
            .iter()
            .all(|v| v.is_nan()));
    }

    let step = ArraySubset::new_with_start_shape(vec![3, 0, 0], vec![1, 3, 4])?;
    assert_eq!(read_f32(dir.path(), "/prcp", &step)?, values);

    println!("Gap steps verified as fill-valued");
    Ok(())
}

#[test]
fn test_conus_subset_assembly() -> Result<(), Box<dyn std::error::Error>> {
    let descriptor = parse_descriptor(CONUS_SPAN_DESCRIPTOR, TdefPrefix::None)?;
    let axis = TimeAxis::daily_range(
        NaiveDate::from_ymd_opt(1998, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(1998, 1, 1).unwrap(),
        1998,
    )?;

    let lat_full = descriptor.lat_coords();
    let lon_full = descriptor.lon_coords();
    let subset = resolve_subset(&lat_full, &lon_full, &CONUS)?;
    assert_eq!(subset.lat, 12..25);
    assert_eq!(subset.lon, 16..48);

    let dir = tempfile::tempdir()?;
    let store = FilesystemStore::new(dir.path())?;
    let mut writer = DatasetWriter::open(
        store,
        &descriptor,
        &axis,
        &lat_full[subset.lat.clone()],
        &lon_full[subset.lon.clone()],
        &WriterOptions::default(),
    )?;

    let full = create_test_grid(80, 40);
    let grid = decode_bytes(&encode_le_grid(&full), &descriptor)?;
    let cropped = grid.crop(subset.lat.clone(), subset.lon.clone())?;
    writer.write_step(0, &cropped)?;
    writer.close()?;

    // coordinates cover only the box
    let store = Arc::new(FilesystemStore::new(dir.path())?);
    let lat = Array::open(store, "/lat")?;
    let lats: Vec<f32> = lat.retrieve_array_subset_elements(&lat.subset_all())?;
    assert_eq!(lats.len(), 13);
    assert_eq!(lats[0], 24.125);
    assert_eq!(lats[12], 48.125);

    // the written step holds the cropped region of the source grid
    let step = ArraySubset::new_with_start_shape(vec![0, 0, 0], vec![1, 13, 32])?;
    let values = read_f32(dir.path(), "/prcp", &step)?;
    assert_eq!(values.len(), 13 * 32);
    assert_eq!(values[0], grid.get(12, 16));
    assert_eq!(values[13 * 32 - 1], grid.get(24, 47));

    println!("CONUS subset assembly verified");
    Ok(())
}
