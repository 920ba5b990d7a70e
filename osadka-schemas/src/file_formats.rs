//! Record shapes of the normalized CSV files produced by the spreadsheet importer.

use serde::Deserialize;

/// One line of `object,cycle,id,mark,settl,total`. Value columns hold the
/// original cell text.
#[derive(Debug, Deserialize)]
pub struct MeasurementRecord {
    pub object: i32,
    pub cycle: i32,
    pub id: String,
    #[serde(default)]
    pub mark: String,
    #[serde(default)]
    pub settl: String,
    #[serde(default)]
    pub total: String,
}

/// One line of `object,id,x,y`, coordinates in the unit chosen at import.
#[derive(Debug, Deserialize)]
pub struct CoordinateRecord {
    pub object: i32,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
}
