//! runcat - status-bar pet animator
//!
//! Prints one frame per line to stdout for a status bar to display. The
//! frame rate follows the selected metric: the busier the machine, the
//! faster the pet runs.

mod app;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use runcat_lib::observability::init_tracing;
use runcat_lib::{AnimationLoopBuilder, MetricKind, Renderer, ReturnType, StructuredLogger};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const RUNCAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Status-bar pet animator
#[derive(Parser)]
#[command(name = "runcat")]
#[command(author, version, about = "Status-bar pet that runs as fast as your machine works", long_about = None)]
pub struct Cli {
    /// Module to run: cpu, ram, temp, eiffel, pigeon or zoo
    pub kind: String,

    /// Directory holding the module configuration files
    #[arg(long, env = "RUNCAT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing("info");

    let config_dir = cli.config_dir.unwrap_or_else(config::default_config_dir);

    let kind = match cli.kind.parse::<MetricKind>() {
        Ok(kind) => kind,
        Err(err) => {
            eprintln!("Error: Module '{}' not found.", cli.kind);
            error!(module = %cli.kind, error = %err, "Unknown module");
            config::ModuleConfig::load(&config_dir, MetricKind::Cpu)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    run(kind, &config_dir).await?;
    Ok(ExitCode::SUCCESS)
}

async fn run(kind: MetricKind, config_dir: &Path) -> Result<()> {
    let module = config::ModuleConfig::load(config_dir, kind)?;
    let user = config::UserConfig::load(config_dir)?;
    info!(module = %kind, config_dir = %config_dir.display(), "Configuration loaded");

    let picture = app::picture(kind, &module, &user, &mut rand::rng())?;
    let sampler = app::sampler(kind, &module, config_dir, &picture.subject);

    let logger = StructuredLogger::new(kind.module_name());
    logger.log_startup(RUNCAT_VERSION, &picture.subject, picture.frames.len());

    let animation = AnimationLoopBuilder::new()
        .sampler(sampler)
        .frames(picture.frames)
        .renderer(Renderer::new(ReturnType::from_config(
            module.return_type.as_deref(),
        )))
        .tooltip_format(module.tooltip_format.clone())
        .sample_interval(module.sample_interval()?)
        .rate(module.ui.rate())
        .strict_fps_check(module.ui.strict_fps_check)
        .logger(logger.clone())
        .build()
        .context("Failed to set up the animation")?;

    if let Err(err) = animation.run().await {
        logger.log_fatal(&err);
        return Err(err).context("Animation stopped");
    }

    Ok(())
}
