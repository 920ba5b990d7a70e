use serde::{Deserialize, Serialize};

/// Planar position of a monitored point, in millimeters.
/// Absent coordinates are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordRow {
    #[serde(with = "nan_as_null")]
    pub x: f64,
    #[serde(with = "nan_as_null")]
    pub y: f64,
}

impl CoordRow {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn missing() -> Self {
        Self { x: f64::NAN, y: f64::NAN }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance, `NaN` when either point lacks a coordinate.
    pub fn distance_to(&self, other: &CoordRow) -> f64 {
        if !self.is_finite() || !other.is_finite() {
            return f64::NAN;
        }
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl Default for CoordRow {
    fn default() -> Self {
        Self::missing()
    }
}

/// One point's reading in one survey cycle.
///
/// Numeric fields are `None` when the cell was empty or could not be parsed;
/// the original cell text is always kept in the `*_raw` fields because it may
/// carry a status marker ("new", "no access", ...) even next to a valid number.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub id: String,
    pub mark: Option<f64>,
    pub settl: Option<f64>,
    pub total: Option<f64>,
    #[serde(default)]
    pub mark_raw: String,
    #[serde(default)]
    pub settl_raw: String,
    #[serde(default)]
    pub total_raw: String,
    pub cycle: i32,
}

impl MeasurementRow {
    /// Builds a row from cell text, parsing every field that holds a number.
    pub fn from_raw(
        id: impl Into<String>,
        cycle: i32,
        mark_raw: impl Into<String>,
        settl_raw: impl Into<String>,
        total_raw: impl Into<String>,
    ) -> Self {
        let mark_raw = mark_raw.into();
        let settl_raw = settl_raw.into();
        let total_raw = total_raw.into();
        Self {
            id: id.into(),
            mark: parse_number(&mark_raw),
            settl: parse_number(&settl_raw),
            total: parse_number(&total_raw),
            mark_raw,
            settl_raw,
            total_raw,
            cycle,
        }
    }

    pub fn has_numeric(&self) -> bool {
        [self.mark, self.settl, self.total]
            .iter()
            .any(|v| v.map_or(false, f64::is_finite))
    }
}

/// Parses a spreadsheet cell as a number. Accepts a comma decimal separator
/// and surrounding whitespace; anything else (including NaN/inf) is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Serializes `NaN` as `null` and reads `null` back as `NaN`, so absent
/// values survive a JSON round-trip.
pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
