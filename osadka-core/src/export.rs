//! CSV tables handed to the workbook exporter.
//!
//! `NaN` cells are written empty.

use crate::{
    dynamics::Series,
    error::OsadkaError,
    report::{
        general::GeneralReportData,
        relative::{RelativeReport, RelativeRow},
    },
    timeline::CycleStateGroup,
};
use csv::Writer;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

fn cell(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[derive(Debug, Serialize)]
struct SummaryEntry<'a> {
    object: i32,
    cycle: i32,
    field: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct RelativeEntry<'a> {
    pair: String,
    id1: &'a str,
    id2: &'a str,
    distance_mm: Option<f64>,
    delta_total_mm: Option<f64>,
    ratio: Option<f64>,
    exceeds_sp: bool,
    exceeds_calc: bool,
}

#[derive(Debug, Serialize)]
struct DynamicsEntry<'a> {
    id: &'a str,
    cycle: i32,
    total_mm: f64,
}

#[derive(Debug, Serialize)]
struct TimelineEntry<'a> {
    group: &'a str,
    kind: &'a str,
    cycle_from: i32,
    cycle_to: i32,
    span: usize,
    annotation: &'a str,
}

struct TableWriter {
    path: String,
    writer: Writer<fs::File>,
}

impl TableWriter {
    fn create(path: impl AsRef<Path>) -> Result<Self, OsadkaError> {
        let path = path.as_ref().display().to_string();
        let writer = Writer::from_path(&path).map_err(|e| OsadkaError::CsvError(path.clone(), e))?;
        Ok(Self { path, writer })
    }

    fn write<T: Serialize>(&mut self, record: T) -> Result<(), OsadkaError> {
        self.writer
            .serialize(record)
            .map_err(|e| OsadkaError::CsvError(self.path.clone(), e))
    }

    fn finish(mut self) -> Result<(), OsadkaError> {
        self.writer
            .flush()
            .map_err(|e| OsadkaError::FileIO(self.path.clone(), e))?;
        debug!(path = %self.path, "table written");
        Ok(())
    }
}

/// One `object,cycle,field,value` line per summary field of every report.
pub fn write_general_summary(
    path: impl AsRef<Path>,
    reports: &[(i32, i32, GeneralReportData)],
) -> Result<(), OsadkaError> {
    let mut table = TableWriter::create(path)?;
    for (object, cycle, report) in reports {
        for (field, value) in report.summary_fields() {
            table.write(SummaryEntry {
                object: *object,
                cycle: *cycle,
                field,
                value: &value,
            })?;
        }
    }
    table.finish()
}

pub fn write_relative_rows(
    path: impl AsRef<Path>,
    report: &RelativeReport,
) -> Result<(), OsadkaError> {
    let mut table = TableWriter::create(path)?;
    for row in &report.all_rows {
        let label = row.label();
        let flagged = |rows: &[RelativeRow]| {
            rows.iter().any(|r| r.id1 == row.id1 && r.id2 == row.id2)
        };
        table.write(RelativeEntry {
            exceeds_sp: flagged(&report.exceeded_sp_rows),
            exceeds_calc: flagged(&report.exceeded_calc_rows),
            pair: label,
            id1: &row.id1,
            id2: &row.id2,
            distance_mm: cell(row.distance),
            delta_total_mm: cell(row.delta_total),
            ratio: cell(row.ratio),
        })?;
    }
    table.finish()
}

pub fn write_dynamics(path: impl AsRef<Path>, series: &[Series]) -> Result<(), OsadkaError> {
    let mut table = TableWriter::create(path)?;
    for s in series {
        for point in &s.points {
            table.write(DynamicsEntry {
                id: &s.id,
                cycle: point.cycle,
                total_mm: point.total,
            })?;
        }
    }
    table.finish()
}

pub fn write_timeline(path: impl AsRef<Path>, groups: &[CycleStateGroup]) -> Result<(), OsadkaError> {
    let mut table = TableWriter::create(path)?;
    for group in groups {
        for segment in group.segments() {
            table.write(TimelineEntry {
                group: &group.display_name,
                kind: segment.kind.label(),
                cycle_from: segment.cycle_from,
                cycle_to: segment.cycle_to,
                span: segment.span,
                annotation: segment.annotation.as_deref().unwrap_or(""),
            })?;
        }
    }
    table.finish()
}
