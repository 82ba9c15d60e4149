//! Battery charge from the power-supply class

use super::{parse_value, read_source, round_percent, MetricKind, MetricSampler};
use crate::classify::ThresholdTable;
use crate::error::{PetError, Result};
use crate::models::Sample;
use async_trait::async_trait;
use std::path::PathBuf;

/// State forced while the charger is plugged in
pub const CHARGING_STATE: &str = "charging";

/// Label while the charger is plugged in
pub const CHARGING_LABEL: &str = "Charging";

/// Label while running on battery
pub const DISCHARGING_LABEL: &str = "Discharging";

/// Value of the AC flag meaning "online"
const AC_ONLINE: &str = "1";

/// Files read by the battery sampler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryPaths {
    pub charge_now: PathBuf,
    pub charge_full: PathBuf,
    pub ac_online: PathBuf,
}

impl Default for BatteryPaths {
    fn default() -> Self {
        Self {
            charge_now: PathBuf::from("/sys/class/power_supply/BAT1/charge_now"),
            charge_full: PathBuf::from("/sys/class/power_supply/BAT1/charge_full"),
            ac_online: PathBuf::from("/sys/class/power_supply/ACAD/online"),
        }
    }
}

/// Sampler for the `eiffel` module
pub struct BatterySampler {
    paths: BatteryPaths,
    states: ThresholdTable,
}

impl BatterySampler {
    pub fn new(paths: BatteryPaths, states: ThresholdTable) -> Self {
        Self { paths, states }
    }

    /// Build the sample from raw readings
    ///
    /// While charging the threshold table is bypassed.
    pub fn evaluate(current: u64, full: u64, ac_flag: &str, states: &ThresholdTable) -> Sample {
        let percent = round_percent(100.0 * current as f64 / full as f64);

        if ac_flag.trim() == AC_ONLINE {
            Sample::new(percent, CHARGING_STATE).with_label(CHARGING_LABEL)
        } else {
            Sample::new(percent, states.classify(percent)).with_label(DISCHARGING_LABEL)
        }
    }
}

#[async_trait]
impl MetricSampler for BatterySampler {
    fn kind(&self) -> MetricKind {
        MetricKind::Battery
    }

    async fn sample(&mut self) -> Result<Sample> {
        let current: u64 = parse_value(
            &self.paths.charge_now,
            &read_source(&self.paths.charge_now).await?,
        )?;
        let full: u64 = parse_value(
            &self.paths.charge_full,
            &read_source(&self.paths.charge_full).await?,
        )?;
        if full == 0 {
            return Err(PetError::malformed(&self.paths.charge_full, "full charge is zero"));
        }
        let ac_flag = read_source(&self.paths.ac_online).await?;

        Ok(Self::evaluate(current, full, &ac_flag, &self.states))
    }
}
