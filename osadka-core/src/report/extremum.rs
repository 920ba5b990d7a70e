use serde::Serialize;

/// Values closer than this are treated as the same extreme.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// A maximal or minimal value together with every id that attains it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremum {
    pub value: f64,
    pub ids: Vec<String>,
}

impl Extremum {
    pub fn empty() -> Self {
        Self {
            value: f64::NAN,
            ids: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for Extremum {
    fn default() -> Self {
        Self::empty()
    }
}

/// Rounds finite values to `decimals` places, halves away from zero.
/// NaN and infinities pass through. A result of zero is always `+0.0`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Extreme of `values` under `pick` (`f64::max` or `f64::min`).
///
/// Ties are collected on the unrounded values; only the reported value is
/// rounded.
pub fn select<'a, I>(values: I, pick: fn(f64, f64) -> f64, decimals: i32) -> Extremum
where
    I: IntoIterator<Item = (&'a str, f64)>,
    I::IntoIter: Clone,
{
    let iter = values.into_iter();
    let Some(extreme) = iter.clone().map(|(_, v)| v).reduce(pick) else {
        return Extremum::empty();
    };
    let ids = iter
        .filter(|(_, v)| (v - extreme).abs() < TIE_TOLERANCE)
        .map(|(id, _)| id.to_string())
        .collect();
    Extremum {
        value: round_to(extreme, decimals),
        ids,
    }
}

pub fn select_max<'a, I>(values: I, decimals: i32) -> Extremum
where
    I: IntoIterator<Item = (&'a str, f64)>,
    I::IntoIter: Clone,
{
    select(values, f64::max, decimals)
}

pub fn select_min<'a, I>(values: I, decimals: i32) -> Extremum
where
    I: IntoIterator<Item = (&'a str, f64)>,
    I::IntoIter: Clone,
{
    select(values, f64::min, decimals)
}
