//! Aggregate statistics for one (object, cycle) worth of measurement rows.

use super::extremum::{round_to, select_max, select_min, Extremum, TIE_TOLERANCE};
use crate::status;
use osadka_schemas::measurement::MeasurementRow;
use serde::Serialize;
use tracing::debug;

const VALUE_DECIMALS: i32 = 4;
const DISPLAY_DECIMALS: i32 = 2;

/// Placeholder shown when a metric has no data.
pub const NO_VALUE: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralReportData {
    pub max_total: Extremum,
    pub min_total: Extremum,
    pub avg_total: Option<f64>,
    pub max_settl: Extremum,
    pub min_settl: Extremum,
    pub avg_settl: Option<f64>,
    pub no_access_ids: Vec<String>,
    pub new_ids: Vec<String>,
    pub destroyed_ids: Vec<String>,
    /// Totals below the standard ("SP") limit.
    pub exceed_total_sp_ids: Vec<String>,
    /// Totals below the calculated limit.
    pub exceed_total_calc_ids: Vec<String>,
    pub total_extremum_value: String,
    pub total_extremum_ids: String,
    pub settl_extremum_value: String,
    pub settl_extremum_ids: String,
}

impl GeneralReportData {
    /// Display strings in export order, keyed by a stable field name.
    pub fn summary_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("max_total", format_value(self.max_total.value)),
            ("max_total_ids", self.max_total.ids.join(" ")),
            ("min_total", format_value(self.min_total.value)),
            ("min_total_ids", self.min_total.ids.join(" ")),
            ("avg_total", format_option(self.avg_total)),
            ("max_settl", format_value(self.max_settl.value)),
            ("max_settl_ids", self.max_settl.ids.join(" ")),
            ("min_settl", format_value(self.min_settl.value)),
            ("min_settl_ids", self.min_settl.ids.join(" ")),
            ("avg_settl", format_option(self.avg_settl)),
            ("total_extremum", self.total_extremum_value.clone()),
            ("total_extremum_ids", self.total_extremum_ids.clone()),
            ("settl_extremum", self.settl_extremum_value.clone()),
            ("settl_extremum_ids", self.settl_extremum_ids.clone()),
            ("no_access_ids", self.no_access_ids.join(" ")),
            ("new_ids", self.new_ids.join(" ")),
            ("destroyed_ids", self.destroyed_ids.join(" ")),
            ("exceed_total_sp_ids", self.exceed_total_sp_ids.join(" ")),
            ("exceed_total_calc_ids", self.exceed_total_calc_ids.join(" ")),
        ]
    }
}

fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", round_to(value, DISPLAY_DECIMALS))
    } else {
        NO_VALUE.to_string()
    }
}

fn format_option(value: Option<f64>) -> String {
    value.map_or_else(|| NO_VALUE.to_string(), format_value)
}

/// Whether `value` settles beyond `limit`.
///
/// Only downward movement counts. A limit that is not finite or not positive
/// is disabled and never flags anything.
pub fn exceeded(value: f64, limit: f64) -> bool {
    limit.is_finite() && limit > 0.0 && value < -limit.abs()
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn average(values: &[(&str, f64)]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|(_, v)| v).sum();
    Some(round_to(sum / values.len() as f64, VALUE_DECIMALS))
}

/// Rounded values split by sign. Zero goes with the positive side.
fn signed_extremes<'a>(
    values: &[(&'a str, f64)],
) -> (Option<f64>, Option<f64>, Vec<(&'a str, f64)>) {
    let rounded: Vec<(&'a str, f64)> = values
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|&(id, v)| (id, round_to(v, DISPLAY_DECIMALS)))
        .collect();
    let negative = rounded
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| *v < 0.0)
        .reduce(f64::min);
    let positive = rounded
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| *v >= 0.0)
        .reduce(f64::max);
    (negative, positive, rounded)
}

/// `"-3.20/+4.40"`, a single signed side, or `"-"` when there is no data.
pub fn extremum_value_string(values: &[(&str, f64)]) -> String {
    let (negative, positive, _) = signed_extremes(values);
    match (negative, positive) {
        (Some(neg), Some(pos)) => format!("{:.2}/+{:.2}", neg, pos),
        (Some(neg), None) => format!("{:.2}", neg),
        (None, Some(pos)) => format!("+{:.2}", pos),
        (None, None) => NO_VALUE.to_string(),
    }
}

/// Ids matching [`extremum_value_string`], laid out the same way.
pub fn extremum_ids_string(values: &[(&str, f64)]) -> String {
    let (negative, positive, rounded) = signed_extremes(values);
    let ids_at = |target: f64| {
        rounded
            .iter()
            .filter(|(_, v)| (v - target).abs() < TIE_TOLERANCE)
            .map(|(id, _)| *id)
            .collect::<Vec<_>>()
            .join(" ")
    };
    match (negative, positive) {
        (Some(neg), Some(pos)) => format!("{} / {}", ids_at(neg), ids_at(pos)),
        (Some(side), None) | (None, Some(side)) => ids_at(side),
        (None, None) => NO_VALUE.to_string(),
    }
}

pub struct GeneralReport;

impl GeneralReport {
    pub fn build(rows: &[MeasurementRow], limit_sp: f64, limit_calc: f64) -> GeneralReportData {
        let totals: Vec<(&str, f64)> = rows
            .iter()
            .filter_map(|r| finite(r.total).map(|v| (r.id.as_str(), v)))
            .collect();
        let settls: Vec<(&str, f64)> = rows
            .iter()
            .filter_map(|r| finite(r.settl).map(|v| (r.id.as_str(), v)))
            .collect();

        let ids_where = |pred: fn(&MeasurementRow) -> bool| -> Vec<String> {
            rows.iter().filter(|r| pred(r)).map(|r| r.id.clone()).collect()
        };
        let exceeding = |limit: f64| -> Vec<String> {
            totals
                .iter()
                .filter(|(_, v)| exceeded(*v, limit))
                .map(|(id, _)| id.to_string())
                .collect()
        };

        let data = GeneralReportData {
            max_total: select_max(totals.iter().copied(), VALUE_DECIMALS),
            min_total: select_min(totals.iter().copied(), VALUE_DECIMALS),
            avg_total: average(&totals),
            max_settl: select_max(settls.iter().copied(), VALUE_DECIMALS),
            min_settl: select_min(settls.iter().copied(), VALUE_DECIMALS),
            avg_settl: average(&settls),
            no_access_ids: ids_where(status::is_no_access),
            new_ids: ids_where(status::is_new),
            destroyed_ids: ids_where(status::is_destroyed),
            exceed_total_sp_ids: exceeding(limit_sp),
            exceed_total_calc_ids: exceeding(limit_calc),
            total_extremum_value: extremum_value_string(&totals),
            total_extremum_ids: extremum_ids_string(&totals),
            settl_extremum_value: extremum_value_string(&settls),
            settl_extremum_ids: extremum_ids_string(&settls),
        };

        debug!(
            rows = rows.len(),
            totals = totals.len(),
            settlements = settls.len(),
            "general report built"
        );
        data
    }
}
