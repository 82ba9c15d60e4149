//! Metric sampling from the Linux pseudo-filesystem
//!
//! Each metric kind has its own sampler producing a percentage-like value
//! and the resulting state. [`Sampler`] dispatches over all of them so the
//! animation loop holds one concrete value chosen at startup.

mod bandwidth;
mod battery;
mod cpu;
mod memory;
mod synthetic;
mod thermal;


pub use bandwidth::{percent_for_signal, BandwidthSampler, DEFAULT_MAX_BPS};
pub use battery::{BatteryPaths, BatterySampler, CHARGING_LABEL, CHARGING_STATE, DISCHARGING_LABEL};
pub use cpu::{CpuSampler, DEFAULT_STAT_FILE};
pub use memory::{MemorySampler, DEFAULT_MEMINFO_FILE};
pub use synthetic::SyntheticSampler;
pub use thermal::{ThermalSampler, DEFAULT_THERMAL_FILE};

use crate::error::{PetError, Result};
use crate::models::Sample;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;

/// Which system resource drives the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Cpu,
    Ram,
    Temperature,
    Battery,
    Bandwidth,
    Synthetic,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Cpu,
        MetricKind::Ram,
        MetricKind::Temperature,
        MetricKind::Battery,
        MetricKind::Bandwidth,
        MetricKind::Synthetic,
    ];

    /// Name used on the command line
    pub fn module_name(&self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Ram => "ram",
            MetricKind::Temperature => "temp",
            MetricKind::Battery => "eiffel",
            MetricKind::Bandwidth => "pigeon",
            MetricKind::Synthetic => "zoo",
        }
    }

    /// Per-module configuration file
    pub fn config_file(&self) -> &'static str {
        match self {
            MetricKind::Cpu => "config.json",
            MetricKind::Ram => "config_ram.json",
            MetricKind::Temperature => "config_temp.json",
            MetricKind::Battery => "config_eiffel.json",
            MetricKind::Bandwidth => "config_pigeon.json",
            MetricKind::Synthetic => "config_zoo.json",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

impl FromStr for MetricKind {
    type Err = PetError;

    fn from_str(s: &str) -> Result<Self> {
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.module_name() == s)
            .ok_or_else(|| PetError::config(format!("Module '{}' not found.", s)))
    }
}

/// A source of percentage samples
#[async_trait]
pub trait MetricSampler: Send {
    fn kind(&self) -> MetricKind;

    /// Read the source once and classify the result
    async fn sample(&mut self) -> Result<Sample>;
}

/// Enum dispatch over the concrete samplers
pub enum Sampler {
    Cpu(CpuSampler),
    Memory(MemorySampler),
    Thermal(ThermalSampler),
    Battery(BatterySampler),
    Bandwidth(BandwidthSampler),
    Synthetic(SyntheticSampler),
}

#[async_trait]
impl MetricSampler for Sampler {
    fn kind(&self) -> MetricKind {
        match self {
            Sampler::Cpu(s) => s.kind(),
            Sampler::Memory(s) => s.kind(),
            Sampler::Thermal(s) => s.kind(),
            Sampler::Battery(s) => s.kind(),
            Sampler::Bandwidth(s) => s.kind(),
            Sampler::Synthetic(s) => s.kind(),
        }
    }

    async fn sample(&mut self) -> Result<Sample> {
        match self {
            Sampler::Cpu(s) => s.sample().await,
            Sampler::Memory(s) => s.sample().await,
            Sampler::Thermal(s) => s.sample().await,
            Sampler::Battery(s) => s.sample().await,
            Sampler::Bandwidth(s) => s.sample().await,
            Sampler::Synthetic(s) => s.sample().await,
        }
    }
}

/// Read a whole pseudo-file
pub(crate) async fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map_err(|source| PetError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse a trimmed single-value file
pub(crate) fn parse_value<T: FromStr>(path: &Path, content: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    content
        .trim()
        .parse()
        .map_err(|e: T::Err| PetError::malformed(path, format!("'{}': {}", content.trim(), e)))
}

/// Round half to even
pub(crate) fn round_percent(value: f64) -> i64 {
    value.round_ties_even() as i64
}
