//! Temperature from a thermal zone
//!
//! The zone reports millidegrees Celsius. Degrees are used directly as the
//! percentage, without clamping.

use super::{parse_value, read_source, round_percent, MetricKind, MetricSampler};
use crate::classify::ThresholdTable;
use crate::error::Result;
use crate::models::Sample;
use async_trait::async_trait;
use std::path::PathBuf;

/// Default thermal zone
pub const DEFAULT_THERMAL_FILE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Sampler for the `temp` module
pub struct ThermalSampler {
    temp_file: PathBuf,
    states: ThresholdTable,
}

impl ThermalSampler {
    pub fn new(temp_file: impl Into<PathBuf>, states: ThresholdTable) -> Self {
        Self {
            temp_file: temp_file.into(),
            states,
        }
    }

    pub fn degrees(millidegrees: i64) -> i64 {
        round_percent(millidegrees as f64 / 1000.0)
    }
}

#[async_trait]
impl MetricSampler for ThermalSampler {
    fn kind(&self) -> MetricKind {
        MetricKind::Temperature
    }

    async fn sample(&mut self) -> Result<Sample> {
        let content = read_source(&self.temp_file).await?;
        let raw: i64 = parse_value(&self.temp_file, &content)?;
        let percent = Self::degrees(raw);

        Ok(Sample::new(percent, self.states.classify(percent)))
    }
}
