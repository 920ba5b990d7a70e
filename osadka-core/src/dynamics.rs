//! Per-point time series of total settlement, for charting.

use osadka_schemas::project::CycleIndex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub cycle: i32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub id: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// Smallest and largest total over all series, for axis bounds.
    pub fn total_range(series: &[Series]) -> Option<(f64, f64)> {
        series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.total))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// One series per point id, in order of first appearance. Cycles where a
/// point has no total contribute no point.
pub fn build_series(cycles: &CycleIndex) -> Vec<Series> {
    let mut series: Vec<Series> = Vec::new();
    for (&cycle, rows) in cycles {
        for row in rows {
            let index = match series.iter().position(|s| s.id == row.id) {
                Some(index) => index,
                None => {
                    series.push(Series {
                        id: row.id.clone(),
                        points: Vec::new(),
                    });
                    series.len() - 1
                }
            };
            let Some(total) = row.total.filter(|v| v.is_finite()) else {
                continue;
            };
            let points = &mut series[index].points;
            if points.last().map_or(true, |p| p.cycle != cycle) {
                points.push(SeriesPoint { cycle, total });
            }
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use osadka_schemas::measurement::MeasurementRow;

    fn row(id: &str, cycle: i32, total: Option<f64>) -> MeasurementRow {
        MeasurementRow {
            id: id.to_string(),
            cycle,
            total,
            ..Default::default()
        }
    }

    #[test]
    fn test_series_are_sparse() {
        let mut cycles = CycleIndex::new();
        cycles.insert(2, vec![row("A", 2, Some(-1.0)), row("B", 2, None)]);
        cycles.insert(1, vec![row("A", 1, Some(0.0)), row("B", 1, Some(0.0))]);
        cycles.insert(3, vec![row("B", 3, Some(-2.5))]);

        let series = build_series(&cycles);
        assert_eq!(series.len(), 2);

        assert_eq!(series[0].id, "A");
        let a: Vec<_> = series[0].points.iter().map(|p| (p.cycle, p.total)).collect();
        assert_eq!(a, vec![(1, 0.0), (2, -1.0)]);

        let b: Vec<_> = series[1].points.iter().map(|p| (p.cycle, p.total)).collect();
        assert_eq!(b, vec![(1, 0.0), (3, -2.5)]);

        assert_eq!(Series::total_range(&series), Some((-2.5, 0.0)));
    }

    #[test]
    fn test_point_without_totals_still_listed() {
        let mut cycles = CycleIndex::new();
        cycles.insert(1, vec![row("X", 1, None)]);
        let series = build_series(&cycles);
        assert_eq!(series.len(), 1);
        assert!(series[0].points.is_empty());
        assert_eq!(Series::total_range(&series), None);
    }
}
