//! Folding per-item scores into per-metric summary statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scores::{METRIC_NAMES, ScoreSet};

/// Summary of one metric across a batch. Only built from a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStat {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl AggregateStat {
    /// `None` for an empty slice.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let sum: f64 = scores.iter().sum();
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean: sum / scores.len() as f64,
            min,
            max,
            count: scores.len(),
        })
    }
}

/// Collects the reported scores for the known metrics in encounter order.
#[derive(Debug, Default)]
pub struct MetricAccumulator {
    scores: BTreeMap<&'static str, Vec<f64>>,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every score in `set` as reported; a failed metric counts as 0.0.
    /// Unavailable sets and unknown metrics add nothing.
    pub fn record(&mut self, set: &ScoreSet) {
        for (name, value) in set.reported() {
            if METRIC_NAMES.contains(&name) {
                self.scores.entry(name).or_default().push(value);
            }
        }
    }

    /// Metrics that never produced a number are left out.
    pub fn finish(&self) -> BTreeMap<String, AggregateStat> {
        self.scores
            .iter()
            .filter_map(|(name, scores)| {
                AggregateStat::from_scores(scores).map(|stat| (name.to_string(), stat))
            })
            .collect()
    }
}
