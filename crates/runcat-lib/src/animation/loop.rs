//! Sampling and emission loops
//!
//! Both loops run forever. There is no shutdown path: the process ends on a
//! signal, or when either loop returns an error, which ends the other one
//! too.

use super::{shared_sample, SampleReader, SampleWriter};
use crate::error::{PetError, Result};
use crate::models::{OutputRecord, Sample, UNKNOWN_PERCENT};
use crate::observability::StructuredLogger;
use crate::rate::{sleep_duration, RateConfig};
use crate::render::Renderer;
use crate::sampler::MetricSampler;
use crate::spinner::Spinner;
use std::io::Write;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Timing configuration of the loop
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    /// Pause between two samples (default: 1 second)
    pub sample_interval: Duration,
    /// Frame-rate bounds
    pub rate: RateConfig,
    /// Reject `fps_high < fps_low`
    pub strict_fps_check: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(1),
            rate: RateConfig::default(),
            strict_fps_check: false,
        }
    }
}

/// The sampling side: read, classify, publish, sleep
pub struct SamplingActivity<S> {
    sampler: S,
    writer: SampleWriter,
    interval: Duration,
    logger: StructuredLogger,
    last_state: Option<String>,
}

impl<S: MetricSampler> SamplingActivity<S> {
    /// Take one sample and publish it
    pub async fn sample_once(&mut self) -> Result<Sample> {
        let sample = self.sampler.sample().await?;

        if self.last_state.as_deref() != Some(sample.state.as_str()) {
            let previous = self
                .last_state
                .replace(sample.state.clone())
                .unwrap_or_default();
            self.logger
                .log_state_change(&previous, &sample.state, sample.percentage);
        }
        debug!(
            percentage = sample.percentage,
            state = %sample.state,
            "Sample published"
        );

        self.writer.publish(sample.clone());
        Ok(sample)
    }

    pub async fn run(mut self) -> Result<()> {
        info!(
            kind = %self.sampler.kind(),
            interval_ms = self.interval.as_millis() as u64,
            "Starting sampling loop"
        );

        loop {
            self.sample_once().await?;
            sleep(self.interval).await;
        }
    }
}

/// The emission side: advance, render, print, sleep
pub struct EmissionActivity {
    spinner: Spinner<String>,
    renderer: Renderer,
    record: OutputRecord,
    reader: SampleReader,
    rate: RateConfig,
    out: Box<dyn Write + Send>,
}

impl EmissionActivity {
    /// Print one frame and return how long to wait before the next one
    ///
    /// While the percentage is unknown the first frame is shown and the
    /// spinner does not move.
    pub fn emit_frame(&mut self) -> Result<Duration> {
        let sample = self.reader.latest();

        self.record.text = if sample.percentage == UNKNOWN_PERCENT {
            self.spinner.first()
        } else {
            self.spinner.next()
        };
        self.record.apply(&sample);

        let line = self.renderer.render(&self.record);
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;

        Ok(sleep_duration(sample.percentage, &self.rate))
    }

    pub fn record(&self) -> &OutputRecord {
        &self.record
    }

    pub async fn run(mut self) -> Result<()> {
        info!(frames = self.spinner.len(), "Starting emission loop");

        loop {
            let delay = self.emit_frame()?;
            sleep(delay).await;
        }
    }
}

/// One sampler, one spinner, one output stream
pub struct AnimationLoop<S> {
    sampling: SamplingActivity<S>,
    emission: EmissionActivity,
}

impl<S: MetricSampler> AnimationLoop<S> {
    pub fn new(
        sampler: S,
        spinner: Spinner<String>,
        renderer: Renderer,
        tooltip_format: impl Into<String>,
        config: AnimationConfig,
        out: Box<dyn Write + Send>,
        logger: StructuredLogger,
    ) -> Result<Self> {
        config.rate.validate(config.strict_fps_check)?;

        let (writer, reader) = shared_sample();

        Ok(Self {
            sampling: SamplingActivity {
                sampler,
                writer,
                interval: config.sample_interval,
                logger,
                last_state: None,
            },
            emission: EmissionActivity {
                spinner,
                renderer,
                record: OutputRecord::new(tooltip_format),
                reader,
                rate: config.rate,
                out,
            },
        })
    }

    /// Split into the two activities, for driving them separately
    pub fn into_parts(self) -> (SamplingActivity<S>, EmissionActivity) {
        (self.sampling, self.emission)
    }

    /// Run both activities until one of them fails
    pub async fn run(self) -> Result<()> {
        let (sampling, emission) = self.into_parts();
        tokio::try_join!(sampling.run(), emission.run())?;
        Ok(())
    }
}

/// Builder for the animation loop
pub struct AnimationLoopBuilder<S> {
    sampler: Option<S>,
    frames: Option<Vec<String>>,
    renderer: Renderer,
    tooltip_format: String,
    config: AnimationConfig,
    out: Option<Box<dyn Write + Send>>,
    logger: Option<StructuredLogger>,
}

impl<S: MetricSampler> AnimationLoopBuilder<S> {
    pub fn new() -> Self {
        Self {
            sampler: None,
            frames: None,
            renderer: Renderer::default(),
            tooltip_format: String::new(),
            config: AnimationConfig::default(),
            out: None,
            logger: None,
        }
    }

    pub fn sampler(mut self, sampler: S) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn frames(mut self, frames: Vec<String>) -> Self {
        self.frames = Some(frames);
        self
    }

    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn tooltip_format(mut self, format: impl Into<String>) -> Self {
        self.tooltip_format = format.into();
        self
    }

    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.config.sample_interval = interval;
        self
    }

    pub fn rate(mut self, rate: RateConfig) -> Self {
        self.config.rate = rate;
        self
    }

    pub fn strict_fps_check(mut self, strict: bool) -> Self {
        self.config.strict_fps_check = strict;
        self
    }

    /// Where frames go (default: stdout)
    pub fn output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Some(Box::new(out));
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<AnimationLoop<S>> {
        let sampler = self
            .sampler
            .ok_or_else(|| PetError::config("a metric sampler is required"))?;
        let frames = self
            .frames
            .ok_or_else(|| PetError::config("a frame sequence is required"))?;
        let spinner = Spinner::new(frames)?;

        let logger = self
            .logger
            .unwrap_or_else(|| StructuredLogger::new(sampler.kind().module_name()));
        let out = self.out.unwrap_or_else(|| Box::new(std::io::stdout()));

        AnimationLoop::new(
            sampler,
            spinner,
            self.renderer,
            self.tooltip_format,
            self.config,
            out,
            logger,
        )
    }
}

impl<S: MetricSampler> Default for AnimationLoopBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReturnType;
    use crate::sampler::MetricKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Mock sampler replaying a fixed list of samples, then failing
    struct ScriptedSampler {
        samples: Vec<Sample>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSampler {
        fn new(samples: Vec<Sample>) -> Self {
            Self {
                samples,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl MetricSampler for ScriptedSampler {
        fn kind(&self) -> MetricKind {
            MetricKind::Synthetic
        }

        async fn sample(&mut self) -> Result<Sample> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.samples.get(call).cloned().ok_or_else(|| {
                PetError::malformed("/mock", "script exhausted")
            })
        }
    }

    /// Cloneable in-memory output
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn frames() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[test]
    fn test_builder_missing_sampler() {
        let result = AnimationLoopBuilder::<ScriptedSampler>::new()
            .frames(frames())
            .build();
        assert!(matches!(result, Err(PetError::Config(_))));
    }

    #[test]
    fn test_builder_empty_frames() {
        let result = AnimationLoopBuilder::new()
            .sampler(ScriptedSampler::new(vec![]))
            .frames(vec![])
            .build();
        assert!(matches!(result, Err(PetError::Config(_))));
    }

    #[test]
    fn test_builder_strict_fps_check() {
        let inverted = RateConfig::new(90.0, 6.0, 100.0);

        let lenient = AnimationLoopBuilder::new()
            .sampler(ScriptedSampler::new(vec![]))
            .frames(frames())
            .rate(inverted.clone())
            .output(SharedBuf::default())
            .build();
        assert!(lenient.is_ok());

        let strict = AnimationLoopBuilder::new()
            .sampler(ScriptedSampler::new(vec![]))
            .frames(frames())
            .rate(inverted)
            .strict_fps_check(true)
            .output(SharedBuf::default())
            .build();
        assert!(strict.is_err());
    }

    #[tokio::test]
    async fn test_emission_follows_published_sample() {
        let buf = SharedBuf::default();
        let animation = AnimationLoopBuilder::new()
            .sampler(ScriptedSampler::new(vec![Sample::new(50, "mid").with_label("x")]))
            .frames(frames())
            .renderer(Renderer::new(ReturnType::Json))
            .tooltip_format("{percentage}% {label}")
            .rate(RateConfig::new(6.0, 90.0, 100.0).with_idle_delay(1.0))
            .output(buf.clone())
            .build()
            .unwrap();
        let (mut sampling, mut emission) = animation.into_parts();

        // idle before the first sample
        assert_eq!(emission.emit_frame().unwrap(), Duration::from_secs(1));

        sampling.sample_once().await.unwrap();
        let delay = emission.emit_frame().unwrap();
        assert!(delay < Duration::from_secs_f64(1.0 / 6.0));
        assert_eq!(emission.record().text, "b");

        let lines = buf.lines();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second["text"], "b");
        assert_eq!(second["class"], "mid");
        assert_eq!(second["tooltip"], "50% x");
    }

    #[tokio::test]
    async fn test_unknown_percent_holds_first_frame() {
        let buf = SharedBuf::default();
        let animation = AnimationLoopBuilder::new()
            .sampler(ScriptedSampler::new(vec![Sample::new(UNKNOWN_PERCENT, "")]))
            .frames(frames())
            .output(buf.clone())
            .build()
            .unwrap();
        let (mut sampling, mut emission) = animation.into_parts();

        sampling.sample_once().await.unwrap();
        for _ in 0..3 {
            emission.emit_frame().unwrap();
        }
        assert_eq!(buf.lines(), vec!["a", "a", "a"]);
    }

    #[tokio::test]
    async fn test_plain_frames_cycle() {
        let buf = SharedBuf::default();
        let animation = AnimationLoopBuilder::new()
            .sampler(ScriptedSampler::new(vec![]))
            .frames(frames())
            .output(buf.clone())
            .build()
            .unwrap();
        let (_, mut emission) = animation.into_parts();

        for _ in 0..4 {
            emission.emit_frame().unwrap();
        }
        assert_eq!(buf.lines(), vec!["a", "b", "c", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampling_failure_stops_both_activities() {
        let buf = SharedBuf::default();
        let sampler = ScriptedSampler::new(vec![Sample::new(20, "low"), Sample::new(40, "mid")]);
        let calls = sampler.calls.clone();

        let animation = AnimationLoopBuilder::new()
            .sampler(sampler)
            .frames(frames())
            .sample_interval(Duration::from_secs(1))
            .output(buf.clone())
            .build()
            .unwrap();

        let result = animation.run().await;

        assert!(matches!(result, Err(PetError::Malformed { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // frames kept coming while sampling was healthy
        assert!(buf.lines().len() > 2);
    }
}
