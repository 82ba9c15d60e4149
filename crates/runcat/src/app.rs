//! Assembly of a module's sampler and frame sequence from configuration

use crate::config::{ModuleConfig, UserConfig};
use anyhow::{Context, Result};
use rand::Rng;
use runcat_lib::sampler::{
    BandwidthSampler, BatteryPaths, BatterySampler, CpuSampler, MemorySampler, SyntheticSampler,
    ThermalSampler,
};
use runcat_lib::subjects::{bounce_frames, zoo_frames, zoo_label};
use runcat_lib::{MetricKind, Sampler, Subject, SubjectTable};
use std::path::Path;

/// What to draw, and what to call it in the logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub subject: String,
    pub frames: Vec<String>,
}

/// Built-in subjects plus those declared in the module file
pub fn subject_table(config: &ModuleConfig) -> Result<SubjectTable> {
    let mut table = SubjectTable::builtin();
    for (name, [start, end]) in &config.subjects {
        table
            .insert(Subject::new(name.clone(), *start, *end))
            .with_context(|| format!("Invalid subject '{}'", name))?;
    }
    Ok(table)
}

/// Choose the frames for `kind`
///
/// Explicit `icons` win. Otherwise the zoo interleaves randomly picked
/// animals, the battery swings back and forth, and everything else loops
/// over its subject's glyphs.
pub fn picture<R: Rng + ?Sized>(
    kind: MetricKind,
    config: &ModuleConfig,
    user: &UserConfig,
    rng: &mut R,
) -> Result<Picture> {
    let table = subject_table(config)?;

    let mut picture = if kind == MetricKind::Synthetic {
        let animals = table.pick_zoo(config.zoo_size, rng)?;
        Picture {
            subject: zoo_label(&animals),
            frames: zoo_frames(&animals)?,
        }
    } else {
        let name = user.subject_for(kind);
        let frames = table.get(&name)?.frames()?;
        let frames = if kind == MetricKind::Battery {
            bounce_frames(&frames)
        } else {
            frames
        };
        Picture {
            subject: name,
            frames,
        }
    };

    if let Some(icons) = &config.icons {
        let frames = icons.frames();
        if !frames.is_empty() {
            picture.frames = frames;
        }
    }

    Ok(picture)
}

/// Sampler reading the source configured for `kind`
pub fn sampler(kind: MetricKind, config: &ModuleConfig, config_dir: &Path, label: &str) -> Sampler {
    let states = config.cpu.states.table();
    let sources = &config.sources;

    match kind {
        MetricKind::Cpu => Sampler::Cpu(CpuSampler::new(
            &config.cpu.stat_file,
            config.ui.sample_rate,
            states,
        )),
        MetricKind::Ram => Sampler::Memory(MemorySampler::new(&sources.meminfo, states)),
        MetricKind::Temperature => {
            Sampler::Thermal(ThermalSampler::new(&sources.temperature, states))
        }
        MetricKind::Battery => Sampler::Battery(BatterySampler::new(
            BatteryPaths {
                charge_now: sources.charge_now.clone(),
                charge_full: sources.charge_full.clone(),
                ac_online: sources.ac_online.clone(),
            },
            states,
        )),
        MetricKind::Bandwidth => Sampler::Bandwidth(BandwidthSampler::new(
            config.bandwidth_file(config_dir),
            sources.bandwidth_max_bps,
            states,
        )),
        MetricKind::Synthetic => Sampler::Synthetic(SyntheticSampler::new(label, states)),
    }
}
