//! Logging for the animator and the bandwidth monitor
//!
//! Standard output is the status-bar channel, so every log line goes to
//! stderr as structured JSON.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init();
}

/// Structured events tagged with the running module
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    module: String,
}

impl StructuredLogger {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Log animator startup
    pub fn log_startup(&self, version: &str, subject: &str, frames: usize) {
        info!(
            event = "runcat_started",
            module = %self.module,
            version = %version,
            subject = %subject,
            frames = frames,
            "Animator started"
        );
    }

    /// Log a change of the classified state
    pub fn log_state_change(&self, previous: &str, current: &str, percentage: i64) {
        info!(
            event = "state_changed",
            module = %self.module,
            previous = %previous,
            current = %current,
            percentage = percentage,
            "State changed"
        );
    }

    /// Log the fault that is about to end the process
    pub fn log_fatal(&self, err: &dyn std::error::Error) {
        error!(
            event = "runcat_failed",
            module = %self.module,
            error = %err,
            "Animation loop stopped"
        );
    }
}
