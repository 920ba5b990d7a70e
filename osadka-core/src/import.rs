//! Reads the normalized CSV tables produced by the spreadsheet importer.

use crate::error::OsadkaError;
use osadka_schemas::{
    file_formats::{CoordinateRecord, MeasurementRecord},
    measurement::{parse_number, CoordRow, MeasurementRow},
    project::ObjectIndex,
    units::{to_mm, Unit},
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, OsadkaError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| OsadkaError::CsvError(path.display().to_string(), e))
}

/// Measurement rows grouped by object and cycle, file order kept within a cycle.
pub fn read_measurements(path: impl AsRef<Path>) -> Result<ObjectIndex, OsadkaError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let mut index = ObjectIndex::new();
    let mut count = 0usize;

    for result in reader.deserialize() {
        let record: MeasurementRecord =
            result.map_err(|e| OsadkaError::CsvError(path.display().to_string(), e))?;
        let id = record.id.trim().to_string();
        let row = MeasurementRow::from_raw(id, record.cycle, record.mark, record.settl, record.total);
        index
            .entry(record.object)
            .or_default()
            .entry(record.cycle)
            .or_default()
            .push(row);
        count += 1;
    }

    info!(path = %path.display(), rows = count, objects = index.len(), "measurements imported");
    Ok(index)
}

/// Coordinates per object, converted to millimeters. Blank cells become `NaN`;
/// text that is neither blank nor a number is rejected.
pub fn read_coordinates(
    path: impl AsRef<Path>,
    unit: Unit,
) -> Result<BTreeMap<i32, Vec<CoordRow>>, OsadkaError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let mut coords: BTreeMap<i32, Vec<CoordRow>> = BTreeMap::new();

    for (i, result) in reader.deserialize().enumerate() {
        let record: CoordinateRecord =
            result.map_err(|e| OsadkaError::CsvError(path.display().to_string(), e))?;
        // Line 1 is the header.
        let line = i as u64 + 2;
        let axis = |raw: &str, name: &str| -> Result<f64, OsadkaError> {
            if raw.trim().is_empty() {
                return Ok(f64::NAN);
            }
            parse_number(raw)
                .map(|v| to_mm(v, unit))
                .ok_or_else(|| OsadkaError::InvalidRecord {
                    path: path.display().to_string(),
                    line,
                    message: format!("{} of point '{}' is not a number: '{}'", name, record.id, raw),
                })
        };
        let row = CoordRow::new(axis(&record.x, "x")?, axis(&record.y, "y")?);
        coords.entry(record.object).or_default().push(row);
    }

    info!(path = %path.display(), objects = coords.len(), unit = %unit, "coordinates imported");
    Ok(coords)
}
