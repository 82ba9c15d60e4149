//! The animation engine
//!
//! Two activities share one current-thread runtime: sampling publishes the
//! latest [`Sample`] through a watch channel, emission reads it, advances the
//! spinner and prints a frame. The sampler is the only writer of the sample
//! fields and the emitter the only writer of the frame text.

mod r#loop;

pub use r#loop::{AnimationConfig, AnimationLoop, AnimationLoopBuilder, EmissionActivity, SamplingActivity};

use crate::models::Sample;
use tokio::sync::watch;

/// Write half of the shared sample, owned by the sampling activity
#[derive(Debug)]
pub struct SampleWriter {
    tx: watch::Sender<Sample>,
}

impl SampleWriter {
    /// Replace the published sample
    pub fn publish(&self, sample: Sample) {
        self.tx.send_replace(sample);
    }
}

/// Read half of the shared sample
///
/// Always sees the most recently published value, never a future one.
#[derive(Debug, Clone)]
pub struct SampleReader {
    rx: watch::Receiver<Sample>,
}

impl SampleReader {
    pub fn latest(&self) -> Sample {
        self.rx.borrow().clone()
    }
}

/// Create the shared sample handle, starting from the idle sample
pub fn shared_sample() -> (SampleWriter, SampleReader) {
    let (tx, rx) = watch::channel(Sample::default());
    (SampleWriter { tx }, SampleReader { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sees_latest_publish() {
        let (writer, reader) = shared_sample();
        assert_eq!(reader.latest(), Sample::default());

        writer.publish(Sample::new(10, "low"));
        writer.publish(Sample::new(80, "high"));
        assert_eq!(reader.latest(), Sample::new(80, "high"));

        let other = reader.clone();
        assert_eq!(other.latest().percentage, 80);
    }
}
