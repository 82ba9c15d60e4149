//! Core data models shared by the samplers, the animation loop and the renderer

/// Percentage sentinel meaning "no data yet"
pub const UNKNOWN_PERCENT: i64 = -1;

/// Percentage value before the first successful sample
pub const IDLE_PERCENT: i64 = 0;

/// The sampler-owned part of the output record
///
/// Published as one snapshot by the sampling activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    pub percentage: i64,
    pub state: String,
    pub label: String,
}

impl Sample {
    pub fn new(percentage: i64, state: impl Into<String>) -> Self {
        Self {
            percentage,
            state: state.into(),
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// True when the percentage carries no load information
    pub fn is_idle(&self) -> bool {
        self.percentage == IDLE_PERCENT || self.percentage == UNKNOWN_PERCENT
    }
}

/// Everything printed for one frame
///
/// `text` is written by the emission activity; `percentage`, `state` and
/// `label` come from the latest published [`Sample`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRecord {
    pub text: String,
    pub alt: String,
    pub percentage: i64,
    pub state: String,
    pub label: String,
    pub tooltip_format: String,
}

impl OutputRecord {
    pub fn new(tooltip_format: impl Into<String>) -> Self {
        Self {
            tooltip_format: tooltip_format.into(),
            ..Default::default()
        }
    }

    /// Copy the sampler-owned fields from a snapshot
    pub fn apply(&mut self, sample: &Sample) {
        self.percentage = sample.percentage;
        self.state.clone_from(&sample.state);
        self.label.clone_from(&sample.label);
    }
}

/// Line encoding requested by the status-bar host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnType {
    /// Only the frame glyph
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

impl ReturnType {
    /// Anything other than `"json"` means plain text
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => ReturnType::Json,
            _ => ReturnType::Plain,
        }
    }
}
