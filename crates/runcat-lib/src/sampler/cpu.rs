//! CPU load from cumulative `/proc/stat` counters
//!
//! Only the aggregate `cpu` line is used. Its user, nice and system columns
//! are summed into one busy counter; the load is the growth of that counter
//! between two reads, normalized by the sample rate and the core count.

use super::{read_source, round_percent, MetricKind, MetricSampler};
use crate::classify::ThresholdTable;
use crate::error::{PetError, Result};
use crate::models::Sample;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default stat pseudo-file
pub const DEFAULT_STAT_FILE: &str = "/proc/stat";

/// Number of counter columns summed into the busy total (user, nice, system)
const BUSY_COLUMNS: usize = 3;

/// Sampler for the `cpu` module
pub struct CpuSampler {
    stat_file: PathBuf,
    sample_rate: f64,
    states: ThresholdTable,
    num_cores: usize,
    prev_total: u64,
    cur_total: u64,
    percent: i64,
}

impl CpuSampler {
    pub fn new(stat_file: impl Into<PathBuf>, sample_rate: f64, states: ThresholdTable) -> Self {
        Self {
            stat_file: stat_file.into(),
            sample_rate,
            states,
            num_cores: 0,
            prev_total: 0,
            cur_total: 0,
            percent: 0,
        }
    }

    /// Preset the core count instead of detecting it on the first read
    pub fn with_cores(mut self, num_cores: usize) -> Self {
        self.num_cores = num_cores;
        self
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    /// Parse the busy total of the aggregate `cpu` line
    pub fn parse_busy_total(path: &Path, content: &str) -> Result<u64> {
        let line = content
            .lines()
            .find(|line| line.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| PetError::malformed(path, "no aggregate cpu line"))?;

        let columns: Vec<&str> = line.split_whitespace().skip(1).take(BUSY_COLUMNS).collect();
        if columns.len() < BUSY_COLUMNS {
            return Err(PetError::malformed(path, "cpu line has too few columns"));
        }

        columns.iter().try_fold(0u64, |acc, column| {
            column
                .parse::<u64>()
                .map(|v| acc + v)
                .map_err(|e| PetError::malformed(path, format!("'{}': {}", column, e)))
        })
    }

    /// Count the per-core `cpuN` lines
    pub fn count_cores(content: &str) -> usize {
        content
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .filter(|name| {
                name.strip_prefix("cpu")
                    .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
            })
            .count()
    }

    /// Feed a new busy total and return the current percentage
    ///
    /// Until two non-zero totals have been seen the percentage keeps its
    /// previous value. The result is not clamped: several busy cores
    /// relative to a small sample rate easily exceed 100.
    pub fn update(&mut self, total: u64) -> i64 {
        self.prev_total = self.cur_total;
        self.cur_total = total;

        if self.prev_total != 0 && self.cur_total != 0 && self.num_cores > 0 {
            let delta = self.cur_total as f64 - self.prev_total as f64;
            self.percent =
                round_percent(delta / self.sample_rate / self.num_cores as f64 * 100.0);
        }
        self.percent
    }
}

#[async_trait]
impl MetricSampler for CpuSampler {
    fn kind(&self) -> MetricKind {
        MetricKind::Cpu
    }

    async fn sample(&mut self) -> Result<Sample> {
        let content = read_source(&self.stat_file).await?;

        if self.num_cores == 0 {
            self.num_cores = Self::count_cores(&content);
            if self.num_cores == 0 {
                return Err(PetError::malformed(&self.stat_file, "no per-core cpu lines"));
            }
            debug!(cores = self.num_cores, "Detected cpu cores");
        }

        let total = Self::parse_busy_total(&self.stat_file, &content)?;
        let percent = self.update(total);

        Ok(Sample::new(percent, self.states.classify(percent)))
    }
}
