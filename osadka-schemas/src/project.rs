use crate::measurement::{nan_as_null, CoordRow, MeasurementRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: &str = "1.0";

/// Rows of one object grouped by cycle number.
pub type CycleIndex = BTreeMap<i32, Vec<MeasurementRow>>;

/// Object number -> cycle number -> rows.
pub type ObjectIndex = BTreeMap<i32, CycleIndex>;

/// Structural limits stored in the project header.
/// `NaN` (or a non-positive value) disables the corresponding check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    /// Absolute settlement limit from the standard ("SP").
    #[serde(with = "nan_as_null")]
    pub max_nomen: f64,
    /// Absolute settlement limit from the project calculation.
    #[serde(with = "nan_as_null")]
    pub max_calculated: f64,
    /// Relative settlement limit from the standard.
    #[serde(with = "nan_as_null")]
    pub rel_nomen: f64,
    /// Relative settlement limit from the project calculation.
    #[serde(with = "nan_as_null")]
    pub rel_calculated: f64,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            max_nomen: f64::NAN,
            max_calculated: f64::NAN,
            rel_nomen: f64::NAN,
            rel_calculated: f64::NAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub schema_version: String,
    #[serde(default)]
    pub limits: ReportLimits,
    #[serde(default)]
    pub objects: ObjectIndex,
    /// Per object, index-aligned with the rows of the cycle being reported.
    #[serde(default)]
    pub coordinates: BTreeMap<i32, Vec<CoordRow>>,
    #[serde(default)]
    pub cycle_labels: BTreeMap<i32, String>,
}

impl Default for ProjectFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            limits: ReportLimits::default(),
            objects: ObjectIndex::new(),
            coordinates: BTreeMap::new(),
            cycle_labels: BTreeMap::new(),
        }
    }
}

impl ProjectFile {
    pub fn cycles(&self, object: i32) -> Option<&CycleIndex> {
        self.objects.get(&object)
    }

    pub fn rows(&self, object: i32, cycle: i32) -> Option<&[MeasurementRow]> {
        self.objects
            .get(&object)
            .and_then(|cycles| cycles.get(&cycle))
            .map(Vec::as_slice)
    }

    pub fn last_cycle(&self, object: i32) -> Option<i32> {
        self.objects
            .get(&object)
            .and_then(|cycles| cycles.keys().next_back().copied())
    }

    pub fn cycle_label(&self, cycle: i32) -> String {
        match self.cycle_labels.get(&cycle) {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => format!("Cycle {}", cycle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_round_trip() {
        let mut project = ProjectFile::default();
        project.limits.max_nomen = 150.0;
        project
            .objects
            .entry(1)
            .or_default()
            .insert(2, vec![MeasurementRow::from_raw("Rp1", 2, "10,5", "-1,2", "-3,4")]);
        project
            .coordinates
            .insert(1, vec![CoordRow::new(0.0, 1000.0), CoordRow::missing()]);
        project.cycle_labels.insert(2, "May 2024".to_string());

        let json = serde_json::to_string_pretty(&project).unwrap();
        let back: ProjectFile = serde_json::from_str(&json).unwrap();

        assert_eq!(back.limits.max_nomen, 150.0);
        assert!(back.limits.rel_nomen.is_nan());
        assert_eq!(back.objects, project.objects);
        assert_eq!(back.coordinates[&1][0], CoordRow::new(0.0, 1000.0));
        assert!(!back.coordinates[&1][1].is_finite());
        assert_eq!(back.cycle_label(2), "May 2024");
        assert_eq!(back.cycle_label(3), "Cycle 3");
    }

    #[test]
    fn test_last_cycle() {
        let mut project = ProjectFile::default();
        let cycles = project.objects.entry(4).or_default();
        cycles.insert(1, vec![]);
        cycles.insert(7, vec![]);
        cycles.insert(3, vec![]);
        assert_eq!(project.last_cycle(4), Some(7));
        assert_eq!(project.last_cycle(5), None);
        assert!(project.rows(4, 2).is_none());
    }
}
