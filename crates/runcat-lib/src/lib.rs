//! Engine for the runcat status-bar animator
//!
//! This crate provides:
//! - Metric samplers for cpu, ram, temperature, battery, bandwidth and a
//!   synthetic random walk
//! - Threshold classification of percentages into named states
//! - The frame spinner and the load-driven frame-rate controller
//! - The animation loop printing one record per frame
//! - Subject glyph tables and bandwidth monitor parsing

pub mod animation;
pub mod bandwidth;
pub mod classify;
pub mod error;
pub mod models;
pub mod observability;
pub mod rate;
pub mod render;
pub mod sampler;
pub mod spinner;
pub mod subjects;

pub use animation::{AnimationConfig, AnimationLoop, AnimationLoopBuilder};
pub use classify::{classify, ThresholdTable};
pub use error::{PetError, Result};
pub use models::*;
pub use observability::StructuredLogger;
pub use rate::{delay, RateConfig};
pub use render::Renderer;
pub use sampler::{MetricKind, MetricSampler, Sampler};
pub use spinner::Spinner;
pub use subjects::{Subject, SubjectTable};
