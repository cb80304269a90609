use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Lengths are kept to this many hundredths internally.
pub const SCALE: f64 = 100.0;

/// Largest accepted stock length. In hundredths it stays under 2^53, so every
/// load and load-plus-item sum is exact in both `u64` and `f64`.
pub const MAX_CAPACITY: f64 = 1e13;

/// Converts a length to fixed-point hundredths, rounding half away from zero.
pub fn to_units(length: f64) -> u64 {
    (length * SCALE).round() as u64
}

/// Converts a capacity to hundredths, flooring so that `units <= capacity`.
pub fn capacity_units(capacity: f64) -> u64 {
    (capacity * SCALE + 1e-6).floor() as u64
}

pub fn from_units(units: u64) -> f64 {
    units as f64 / SCALE
}

/// Rounds a length to two decimal places.
pub fn round_length(length: f64) -> f64 {
    (length * SCALE).round() / SCALE
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Demand {
    pub length: f64,
    #[serde(default = "default_qty", deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
}

fn default_qty() -> u32 {
    1
}

impl Demand {
    pub fn new(length: f64, qty: u32) -> Self {
        Self { length, qty }
    }
}

/// Expands demands into one raw item per required piece, in input order.
pub fn expand_demands(demands: &[Demand]) -> Vec<f64> {
    demands
        .iter()
        .flat_map(|d| std::iter::repeat_n(d.length, d.qty as usize))
        .collect()
}

/// Accepts `3` as well as `3.0` from JSON clients that only know doubles.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(serde::de::Error::custom);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        ))),
    }
}

/// Limits on how much of the search tree may be explored before giving up.
/// Missing fields take their [`Default`] values; an explicit `null` lifts
/// that limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchBudget {
    pub max_nodes: Option<u64>,
    #[serde(rename = "time_limit_ms", with = "opt_millis")]
    pub time_limit: Option<Duration>,
}

pub const DEFAULT_MAX_NODES: u64 = 50_000_000;

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_nodes: Some(DEFAULT_MAX_NODES),
            time_limit: None,
        }
    }
}

impl SearchBudget {
    pub fn unbounded() -> Self {
        Self {
            max_nodes: None,
            time_limit: None,
        }
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

mod opt_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

fn serialize_millis<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(value.as_secs_f64() * 1000.0)
}

/// One stock bar and the buffered cuts assigned to it, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub cuts: Vec<f64>,
    pub load: f64,
    pub unused: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub nodes_explored: u64,
    pub branches_pruned: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub capacity: f64,
    pub buffer: f64,
    pub bins: Vec<Bin>,
    pub stats: SearchStats,
}

impl Solution {
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// The bare partition: each bin's buffered cut lengths.
    pub fn partition(&self) -> Vec<Vec<f64>> {
        self.bins.iter().map(|b| b.cuts.clone()).collect()
    }

    pub fn total_unused(&self) -> f64 {
        round_length(self.bins.iter().map(|b| b.unused).sum())
    }

    pub fn total_waste_percent(&self) -> f64 {
        let total_stock = self.capacity * self.bins.len() as f64;
        if total_stock <= 0.0 {
            return 0.0;
        }
        self.total_unused() / total_stock * 100.0
    }
}
