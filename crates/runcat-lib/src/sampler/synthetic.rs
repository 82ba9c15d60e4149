//! Bounded random walk for the `zoo` module

use super::{MetricKind, MetricSampler};
use crate::classify::ThresholdTable;
use crate::error::Result;
use crate::models::Sample;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest step of the walk, in either direction
const MAX_STEP: f64 = 4.0;

/// Lower bound of the walk after the first sample
const WALK_MIN: f64 = 10.0;

/// Upper bound of the walk
const WALK_MAX: f64 = 100.0;

/// Sampler producing a wandering load value
pub struct SyntheticSampler {
    rng: StdRng,
    last: Option<i64>,
    label: String,
    states: ThresholdTable,
}

impl SyntheticSampler {
    pub fn new(label: impl Into<String>, states: ThresholdTable) -> Self {
        Self::with_rng(StdRng::from_os_rng(), label, states)
    }

    /// Deterministic walk for tests
    pub fn with_seed(seed: u64, label: impl Into<String>, states: ThresholdTable) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), label, states)
    }

    fn with_rng(rng: StdRng, label: impl Into<String>, states: ThresholdTable) -> Self {
        Self {
            rng,
            last: None,
            label: label.into(),
            states,
        }
    }

    /// Next value of the walk
    ///
    /// Starts anywhere in `0..=100`, then moves by at most [`MAX_STEP`] per
    /// call while staying inside `10..=100`.
    pub fn step(&mut self) -> i64 {
        let percent = match self.last {
            None => self.rng.random_range(0..=100),
            Some(last) => {
                let delta = self.rng.random_range(-MAX_STEP..=MAX_STEP);
                (last as f64 + delta).clamp(WALK_MIN, WALK_MAX) as i64
            }
        };
        self.last = Some(percent);
        percent
    }
}

#[async_trait]
impl MetricSampler for SyntheticSampler {
    fn kind(&self) -> MetricKind {
        MetricKind::Synthetic
    }

    async fn sample(&mut self) -> Result<Sample> {
        let percent = self.step();
        Ok(Sample::new(percent, self.states.classify(percent)).with_label(self.label.clone()))
    }
}
