//! RAM usage from `/proc/meminfo`

use super::{read_source, round_percent, MetricKind, MetricSampler};
use crate::classify::ThresholdTable;
use crate::error::{PetError, Result};
use crate::models::Sample;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Default meminfo pseudo-file
pub const DEFAULT_MEMINFO_FILE: &str = "/proc/meminfo";

/// Sampler for the `ram` module
pub struct MemorySampler {
    meminfo_file: PathBuf,
    states: ThresholdTable,
}

impl MemorySampler {
    pub fn new(meminfo_file: impl Into<PathBuf>, states: ThresholdTable) -> Self {
        Self {
            meminfo_file: meminfo_file.into(),
            states,
        }
    }

    /// Parse `MemTotal` and `MemAvailable` (both in kB)
    pub fn parse_meminfo(path: &Path, content: &str) -> Result<(u64, u64)> {
        let mut total = None;
        let mut available = None;

        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let slot = match parts.next() {
                Some("MemTotal:") => &mut total,
                Some("MemAvailable:") => &mut available,
                _ => continue,
            };
            let value = parts
                .next()
                .ok_or_else(|| PetError::malformed(path, format!("no value in '{}'", line)))?;
            *slot = Some(
                value
                    .parse::<u64>()
                    .map_err(|e| PetError::malformed(path, format!("'{}': {}", value, e)))?,
            );
        }

        match (total, available) {
            (Some(0), _) => Err(PetError::malformed(path, "MemTotal is zero")),
            (Some(total), Some(available)) => Ok((total, available)),
            _ => Err(PetError::malformed(path, "MemTotal or MemAvailable missing")),
        }
    }

    /// Share of memory in use
    pub fn percent_used(total: u64, available: u64) -> i64 {
        round_percent(100.0 * (1.0 - available as f64 / total as f64))
    }
}

#[async_trait]
impl MetricSampler for MemorySampler {
    fn kind(&self) -> MetricKind {
        MetricKind::Ram
    }

    async fn sample(&mut self) -> Result<Sample> {
        let content = read_source(&self.meminfo_file).await?;
        let (total, available) = Self::parse_meminfo(&self.meminfo_file, &content)?;
        let percent = Self::percent_used(total, available);

        Ok(Sample::new(percent, self.states.classify(percent)))
    }
}
