use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Linear units accepted at the import/export boundaries.
/// Everything inside the model is stored in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "dm")]
    Decimeter,
    #[serde(rename = "m")]
    Meter,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Millimeter, Unit::Centimeter, Unit::Decimeter, Unit::Meter];

    /// Millimeters in one of this unit.
    pub fn factor(self) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Centimeter => 10.0,
            Unit::Decimeter => 100.0,
            Unit::Meter => 1000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Decimeter => "dm",
            Unit::Meter => "m",
        }
    }
}

pub fn to_mm(value: f64, unit: Unit) -> f64 {
    value * unit.factor()
}

pub fn mm_to(value: f64, unit: Unit) -> f64 {
    value / unit.factor()
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown unit '{0}' (expected mm, cm, dm or m)")]
pub struct UnknownUnit(pub String);

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Unit::ALL
            .into_iter()
            .find(|u| u.label() == normalized)
            .ok_or_else(|| UnknownUnit(s.to_string()))
    }
}
