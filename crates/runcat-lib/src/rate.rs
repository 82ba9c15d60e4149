//! Frame-rate control
//!
//! The frame period is interpolated linearly between the low-FPS period at
//! 0% load and the high-FPS period at `sample_rate` percent load: the busier
//! the machine, the faster the pet runs.

use crate::error::{PetError, Result};
use crate::models::{IDLE_PERCENT, UNKNOWN_PERCENT};
use std::time::Duration;

/// Default normalization divisor for the percent scale
pub const DEFAULT_SAMPLE_RATE: f64 = 100.0;

/// Default lower frame rate
pub const DEFAULT_FPS_LOW: f64 = 6.0;

/// Default upper frame rate
pub const DEFAULT_FPS_HIGH: f64 = 90.0;

/// Frame-rate bounds
#[derive(Debug, Clone, PartialEq)]
pub struct RateConfig {
    pub sample_rate: f64,
    pub fps_low: f64,
    pub fps_high: f64,
    /// Delay used while the percentage is idle or unknown.
    /// `None` falls back to the low-FPS period.
    pub idle_delay: Option<f64>,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            fps_low: DEFAULT_FPS_LOW,
            fps_high: DEFAULT_FPS_HIGH,
            idle_delay: None,
        }
    }
}

impl RateConfig {
    pub fn new(fps_low: f64, fps_high: f64, sample_rate: f64) -> Self {
        Self {
            sample_rate,
            fps_low,
            fps_high,
            idle_delay: None,
        }
    }

    pub fn with_idle_delay(mut self, seconds: f64) -> Self {
        self.idle_delay = Some(seconds);
        self
    }

    /// Check the bounds
    ///
    /// Positivity is always required. `fps_high >= fps_low` is only enforced
    /// when `strict` is set.
    pub fn validate(&self, strict: bool) -> Result<()> {
        if !(self.sample_rate > 0.0) {
            return Err(PetError::config("sample_rate must be positive"));
        }
        if !(self.fps_low > 0.0) || !(self.fps_high > 0.0) {
            return Err(PetError::config("fps_l and fps_h must be positive"));
        }
        if let Some(idle) = self.idle_delay {
            if !(idle >= 0.0) {
                return Err(PetError::config("idle_delay must not be negative"));
            }
        }
        if strict && self.fps_high < self.fps_low {
            return Err(PetError::config("fps_h can't be lower than fps_l"));
        }
        Ok(())
    }

    /// Period change per percent of load
    pub fn fps_delta(&self) -> f64 {
        (1.0 / self.fps_low - 1.0 / self.fps_high) / self.sample_rate
    }

    fn idle(&self) -> f64 {
        self.idle_delay.unwrap_or(1.0 / self.fps_low)
    }
}

/// Seconds until the next frame
///
/// Idle (`0`) and unknown (`-1`) percentages use the idle delay. Other
/// values go through the interpolation unclamped, so a percentage above
/// `sample_rate` yields a period shorter than the high-FPS one and can even
/// turn negative.
pub fn delay(percent: i64, cfg: &RateConfig) -> f64 {
    if percent == IDLE_PERCENT || percent == UNKNOWN_PERCENT {
        return cfg.idle();
    }
    1.0 / cfg.fps_low - cfg.fps_delta() * percent as f64
}

/// [`delay`] as a sleep duration; negative delays become zero
pub fn sleep_duration(percent: i64, cfg: &RateConfig) -> Duration {
    Duration::try_from_secs_f64(delay(percent, cfg).max(0.0)).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RateConfig {
        RateConfig::new(6.0, 90.0, 100.0)
    }

    #[test]
    fn test_zero_load_uses_low_fps_period() {
        assert!((delay(0, &cfg()) - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonically_decreasing() {
        let cfg = cfg();
        let d0 = delay(0, &cfg);
        let d1 = delay(1, &cfg);
        let d50 = delay(50, &cfg);
        let d100 = delay(100, &cfg);
        assert!(d100 < d50);
        assert!(d50 < d0);
        assert!(d50 < d1);
    }

    #[test]
    fn test_full_load_reaches_high_fps_period() {
        assert!((delay(100, &cfg()) - 1.0 / 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_idle_delay_override() {
        let cfg = cfg().with_idle_delay(1.0);
        assert_eq!(delay(0, &cfg), 1.0);
        assert_eq!(delay(UNKNOWN_PERCENT, &cfg), 1.0);
        assert!(delay(10, &cfg) < 1.0 / 6.0);
    }

    #[test]
    fn test_unclamped_can_go_negative() {
        let cfg = cfg();
        assert!(delay(200, &cfg) < 0.0);
        assert_eq!(sleep_duration(200, &cfg), Duration::ZERO);
    }

    #[test]
    fn test_validate() {
        assert!(cfg().validate(true).is_ok());

        let inverted = RateConfig::new(90.0, 6.0, 100.0);
        assert!(inverted.validate(false).is_ok());
        assert!(inverted.validate(true).unwrap_err().is_config());

        assert!(RateConfig::new(0.0, 6.0, 100.0).validate(false).is_err());
        assert!(RateConfig::new(6.0, 90.0, 0.0).validate(false).is_err());
        assert!(cfg().with_idle_delay(-1.0).validate(false).is_err());
    }
}
