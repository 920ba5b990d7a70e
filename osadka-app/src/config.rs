use anyhow::{Context, Result};
use osadka_schemas::{project::ReportLimits, units::Unit};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// Optional replacements for the limits stored in the project header.
/// Unset fields keep the project's value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LimitOverrides {
    pub max_nomen: Option<f64>,
    pub max_calculated: Option<f64>,
    pub rel_nomen: Option<f64>,
    pub rel_calculated: Option<f64>,
}

impl LimitOverrides {
    pub fn apply(&self, limits: ReportLimits) -> ReportLimits {
        ReportLimits {
            max_nomen: self.max_nomen.unwrap_or(limits.max_nomen),
            max_calculated: self.max_calculated.unwrap_or(limits.max_calculated),
            rel_nomen: self.rel_nomen.unwrap_or(limits.rel_nomen),
            rel_calculated: self.rel_calculated.unwrap_or(limits.rel_calculated),
        }
    }
}

/// Settings for one `report` run, read from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub project: PathBuf,
    pub output_dir: PathBuf,
    /// Objects to report; empty means all.
    pub objects: Vec<i32>,
    /// Cycles to report; empty means the last cycle of each object.
    pub cycles: Vec<i32>,
    pub limits: LimitOverrides,
    /// Unit used for the printed summary. Tables and charts stay in mm.
    pub display_unit: Unit,
    pub charts: bool,
    pub chart_size: (u32, u32),
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            project: PathBuf::from("project.json"),
            output_dir: PathBuf::from("./data/runs"),
            objects: Vec::new(),
            cycles: Vec::new(),
            limits: LimitOverrides::default(),
            display_unit: Unit::Millimeter,
            charts: true,
            chart_size: (1024, 768),
        }
    }
}

impl ReportConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse YAML from {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ReportConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg, ReportConfig::default());
        assert!(cfg.charts);
        assert_eq!(cfg.chart_size, (1024, 768));
    }

    #[test]
    fn test_full_config() {
        let cfg = ReportConfig::from_yaml(
            r#"
project: site/project.json
output_dir: out
objects: [1, 3]
cycles: [5]
display_unit: cm
charts: false
chart_size: [800, 600]
limits:
  max_nomen: 150
  rel_calculated: 0.002
"#,
        )
        .unwrap();
        assert_eq!(cfg.project, PathBuf::from("site/project.json"));
        assert_eq!(cfg.objects, vec![1, 3]);
        assert_eq!(cfg.cycles, vec![5]);
        assert_eq!(cfg.display_unit, Unit::Centimeter);
        assert!(!cfg.charts);
        assert_eq!(cfg.chart_size, (800, 600));
        assert_eq!(cfg.limits.max_nomen, Some(150.0));
        assert_eq!(cfg.limits.max_calculated, None);
    }

    #[test]
    fn test_limit_overrides() {
        let header = ReportLimits {
            max_nomen: 100.0,
            max_calculated: 80.0,
            rel_nomen: f64::NAN,
            rel_calculated: 0.001,
        };
        let overrides = LimitOverrides {
            max_calculated: Some(60.0),
            rel_nomen: Some(0.002),
            ..Default::default()
        };
        let limits = overrides.apply(header);
        assert_eq!(limits.max_nomen, 100.0);
        assert_eq!(limits.max_calculated, 60.0);
        assert_eq!(limits.rel_nomen, 0.002);
        assert_eq!(limits.rel_calculated, 0.001);
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        assert!(ReportConfig::from_yaml("display_unit: inch").is_err());
    }
}
