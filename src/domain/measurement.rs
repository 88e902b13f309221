// Measurement history and the parallel-array data payload
use super::telemetry::RawValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// 30 days of hourly samples
pub const CACHE_LIMIT: usize = 24 * 30;

pub const TIME_KEY: &str = "time";

/// Metric keys with their display units
pub const METRICS: [(&str, &str); 9] = [
    ("cu_workload", "%"),
    ("cu_electrical_power", "kW"),
    ("cu_thermal_power", "kW"),
    ("cu_total_gas_consumption", "kWh"),
    ("plb_workload", "%"),
    ("plb_thermal_power", "kW"),
    ("plb_total_gas_consumption", "kWh"),
    ("hs_level", "%"),
    ("thermal_consumption", "kW"),
];

pub fn unit_for(metric: &str) -> Option<&'static str> {
    METRICS
        .iter()
        .find(|(key, _)| *key == metric)
        .map(|(_, unit)| *unit)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One hourly sample of every metric, in `METRICS` order
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub time: i64,
    pub values: [f64; METRICS.len()],
}

impl Measurement {
    pub fn new(time: i64, values: [f64; METRICS.len()]) -> Self {
        Self {
            time,
            values: values.map(round2),
        }
    }

    pub fn value(&self, metric: &str) -> Option<f64> {
        METRICS
            .iter()
            .position(|(key, _)| *key == metric)
            .map(|idx| self.values[idx])
    }
}

/// Bounded measurement history; the oldest sample is evicted first
#[derive(Debug, Clone)]
pub struct MeasurementLog {
    entries: VecDeque<Measurement>,
    limit: usize,
}

impl Default for MeasurementLog {
    fn default() -> Self {
        Self::with_limit(CACHE_LIMIT)
    }
}

impl MeasurementLog {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, measurement: Measurement) {
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        if self.limit > 0 {
            self.entries.push_back(measurement);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&Measurement> {
        self.entries.back()
    }

    pub fn snapshot(&self) -> DataPayload {
        let mut columns = BTreeMap::new();
        columns.insert(
            TIME_KEY.to_string(),
            self.entries
                .iter()
                .map(|m| RawValue::Number(m.time as f64))
                .collect(),
        );
        for (idx, (key, _)) in METRICS.iter().enumerate() {
            columns.insert(
                key.to_string(),
                self.entries
                    .iter()
                    .map(|m| RawValue::Number(m.values[idx]))
                    .collect(),
            );
        }
        DataPayload { columns }
    }
}

/// `time` plus one array per metric, all parallel-indexed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPayload {
    pub columns: BTreeMap<String, Vec<RawValue>>,
}

impl DataPayload {
    pub fn column(&self, key: &str) -> &[RawValue] {
        self.columns.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last(&self, key: &str) -> Option<&RawValue> {
        self.columns.get(key).and_then(|values| values.last())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RawValue])> {
        self.columns
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}
