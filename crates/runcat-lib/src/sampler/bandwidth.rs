//! Network bandwidth from the side-channel file
//!
//! `runcat-bwmon` keeps the file updated with the total bits per second.
//! The value is mapped onto 21 levels of 5%.

use super::{read_source, MetricKind, MetricSampler};
use crate::bandwidth::parse_decimal;
use crate::classify::ThresholdTable;
use crate::error::{PetError, Result};
use crate::models::Sample;
use async_trait::async_trait;
use std::path::PathBuf;

/// Bits per second considered full load
pub const DEFAULT_MAX_BPS: f64 = 1e8;

/// Sampler for the `pigeon` module
pub struct BandwidthSampler {
    signal_file: PathBuf,
    max_bps: f64,
    states: ThresholdTable,
}

impl BandwidthSampler {
    pub fn new(signal_file: impl Into<PathBuf>, max_bps: f64, states: ThresholdTable) -> Self {
        Self {
            signal_file: signal_file.into(),
            max_bps,
            states,
        }
    }
}

/// Percentage in steps of 5, capped at 100
pub fn percent_for_signal(signal: f64, max_bps: f64) -> i64 {
    ((20.0 * (signal / max_bps).min(1.0)).ceil() * 5.0) as i64
}

#[async_trait]
impl MetricSampler for BandwidthSampler {
    fn kind(&self) -> MetricKind {
        MetricKind::Bandwidth
    }

    async fn sample(&mut self) -> Result<Sample> {
        let content = read_source(&self.signal_file).await?;
        let signal = parse_decimal(&content)
            .ok_or_else(|| PetError::malformed(&self.signal_file, format!("'{}'", content.trim())))?;
        let percent = percent_for_signal(signal, self.max_bps);

        Ok(Sample::new(percent, self.states.classify(percent)))
    }
}
