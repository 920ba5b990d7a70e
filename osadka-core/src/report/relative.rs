//! Differential settlement between every pair of points of one cycle.

use super::extremum::{round_to, Extremum, TIE_TOLERANCE};
use osadka_schemas::measurement::{CoordRow, MeasurementRow};
use serde::Serialize;
use tracing::debug;

const LENGTH_DECIMALS: i32 = 4;
const RATIO_DECIMALS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeRow {
    pub id1: String,
    pub id2: String,
    pub distance: f64,
    pub delta_total: f64,
    pub ratio: f64,
}

impl RelativeRow {
    pub fn label(&self) -> String {
        format!("{}-{}", self.id1, self.id2)
    }

    pub fn has_ratio(&self) -> bool {
        self.ratio.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeReport {
    /// Every pair, including the ones without usable data.
    pub all_rows: Vec<RelativeRow>,
    pub exceeded_sp_rows: Vec<RelativeRow>,
    pub exceeded_calc_rows: Vec<RelativeRow>,
    pub max_relative: Extremum,
}

fn finite_total(row: &MeasurementRow) -> f64 {
    row.total.filter(|v| v.is_finite()).unwrap_or(f64::NAN)
}

fn pair_row(a: (&CoordRow, &MeasurementRow), b: (&CoordRow, &MeasurementRow)) -> RelativeRow {
    let distance = a.0.distance_to(b.0);
    let (total_a, total_b) = (finite_total(a.1), finite_total(b.1));
    let delta_total = if total_a.is_finite() && total_b.is_finite() {
        total_b - total_a
    } else {
        f64::NAN
    };
    let ratio = if distance.is_finite() && distance > 0.0 && delta_total.is_finite() {
        delta_total / distance
    } else {
        f64::NAN
    };

    RelativeRow {
        id1: a.1.id.clone(),
        id2: b.1.id.clone(),
        distance: round_to(distance, LENGTH_DECIMALS),
        delta_total: round_to(delta_total, LENGTH_DECIMALS),
        ratio: round_to(ratio, RATIO_DECIMALS),
    }
}

fn max_abs_ratio(rows: &[&RelativeRow]) -> Extremum {
    let Some(extreme) = rows.iter().map(|r| r.ratio.abs()).reduce(f64::max) else {
        return Extremum::empty();
    };
    Extremum {
        value: round_to(extreme, RATIO_DECIMALS),
        ids: rows
            .iter()
            .filter(|r| (r.ratio.abs() - extreme).abs() < TIE_TOLERANCE)
            .map(|r| r.label())
            .collect(),
    }
}

impl RelativeReport {
    /// Pairs `coords[i]` with `rows[i]`; nothing is matched by id.
    ///
    /// Both slices are expected to have the same length. Extra entries on the
    /// longer side are ignored.
    pub fn build(
        coords: &[CoordRow],
        rows: &[MeasurementRow],
        limit_sp: f64,
        limit_calc: f64,
    ) -> RelativeReport {
        let points: Vec<(&CoordRow, &MeasurementRow)> = coords.iter().zip(rows).collect();

        let mut all_rows = Vec::with_capacity(points.len() * points.len().saturating_sub(1) / 2);
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                all_rows.push(pair_row(points[i], points[j]));
            }
        }

        let with_ratio: Vec<&RelativeRow> = all_rows.iter().filter(|r| r.has_ratio()).collect();
        let exceeding = |limit: f64| -> Vec<RelativeRow> {
            with_ratio
                .iter()
                .filter(|r| r.ratio.abs() > limit)
                .map(|r| (*r).clone())
                .collect()
        };
        let exceeded_sp_rows = exceeding(limit_sp);
        let exceeded_calc_rows = exceeding(limit_calc);
        let max_relative = max_abs_ratio(&with_ratio);

        debug!(
            points = points.len(),
            pairs = all_rows.len(),
            with_ratio = with_ratio.len(),
            "relative report built"
        );

        RelativeReport {
            all_rows,
            exceeded_sp_rows,
            exceeded_calc_rows,
            max_relative,
        }
    }
}
