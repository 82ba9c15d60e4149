//! Module configuration
//!
//! Each module reads its own JSON file from the configuration directory
//! (`config.json` for cpu, `config_ram.json`, ...), overridable through
//! `RUNCAT__SECTION__KEY` environment variables. A second file,
//! `user_conf.json`, picks the subject drawn for each module.

use anyhow::{Context, Result};
use runcat_lib::rate::{DEFAULT_FPS_HIGH, DEFAULT_FPS_LOW, DEFAULT_SAMPLE_RATE};
use runcat_lib::sampler::{DEFAULT_MAX_BPS, DEFAULT_MEMINFO_FILE, DEFAULT_STAT_FILE, DEFAULT_THERMAL_FILE};
use runcat_lib::{MetricKind, RateConfig, ThresholdTable};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment prefix for overrides
const ENV_PREFIX: &str = "RUNCAT";

/// User-level file selecting subjects
const USER_CONFIG_FILE: &str = "user_conf.json";

/// Default directory holding the configuration files
pub fn default_config_dir() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("waybar").join("modules").join("runcat-text"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Frame override: a string of glyphs or a list of frames
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Icons {
    Glyphs(String),
    Frames(Vec<String>),
}

impl Icons {
    pub fn frames(&self) -> Vec<String> {
        match self {
            Icons::Glyphs(glyphs) => glyphs.chars().map(String::from).collect(),
            Icons::Frames(frames) => frames.clone(),
        }
    }
}

/// Per-module configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    /// Explicit frames, replacing the subject's glyph range
    #[serde(default)]
    pub icons: Option<Icons>,

    #[serde(rename = "tooltip-format", default)]
    pub tooltip_format: String,

    /// `"json"` for structured output, anything else for plain text
    #[serde(rename = "return-type", default)]
    pub return_type: Option<String>,

    #[serde(default)]
    pub cpu: SamplingSection,

    #[serde(default)]
    pub ui: UiSection,

    /// Number of animals interleaved in zoo mode
    #[serde(rename = "how_many_animals_in_a_zoo", default = "default_zoo_size")]
    pub zoo_size: usize,

    #[serde(default)]
    pub sources: SourcesSection,

    /// Extra subjects: name to `[first, end)` code points
    #[serde(default)]
    pub subjects: BTreeMap<String, [u32; 2]>,
}

/// Sampling settings
///
/// Kept under the `cpu` key for every module, whatever it samples.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SamplingSection {
    /// Seconds between two samples
    #[serde(default = "default_interval")]
    pub interval: f64,

    #[serde(default = "default_stat_file")]
    pub stat_file: PathBuf,

    /// State name to threshold, in file order
    #[serde(default)]
    pub states: StateEntries,
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            stat_file: default_stat_file(),
            states: StateEntries::default(),
        }
    }
}

/// Frame-rate settings
#[derive(Debug, Clone, Deserialize)]
pub struct UiSection {
    #[serde(default = "default_fps_low")]
    pub fps_l: f64,

    #[serde(default = "default_fps_high")]
    pub fps_h: f64,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Seconds between frames while there is no load data
    #[serde(default = "default_idle_delay")]
    pub idle_delay: f64,

    #[serde(rename = "strict-fps-check", default)]
    pub strict_fps_check: bool,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            fps_l: default_fps_low(),
            fps_h: default_fps_high(),
            sample_rate: default_sample_rate(),
            idle_delay: default_idle_delay(),
            strict_fps_check: false,
        }
    }
}

impl UiSection {
    pub fn rate(&self) -> RateConfig {
        RateConfig::new(self.fps_l, self.fps_h, self.sample_rate).with_idle_delay(self.idle_delay)
    }
}

/// Locations of the metric sources
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourcesSection {
    #[serde(default = "default_meminfo")]
    pub meminfo: PathBuf,

    #[serde(default = "default_temperature")]
    pub temperature: PathBuf,

    #[serde(default = "default_charge_now")]
    pub charge_now: PathBuf,

    #[serde(default = "default_charge_full")]
    pub charge_full: PathBuf,

    #[serde(default = "default_ac_online")]
    pub ac_online: PathBuf,

    /// Side-channel file written by `runcat-bwmon`; defaults to `bw.log`
    /// in the configuration directory
    #[serde(default)]
    pub bandwidth: Option<PathBuf>,

    #[serde(default = "default_max_bps")]
    pub bandwidth_max_bps: f64,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            meminfo: default_meminfo(),
            temperature: default_temperature(),
            charge_now: default_charge_now(),
            charge_full: default_charge_full(),
            ac_online: default_ac_online(),
            bandwidth: None,
            bandwidth_max_bps: default_max_bps(),
        }
    }
}

/// Threshold entries in the order they appear in the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateEntries(pub Vec<(String, i64)>);

impl StateEntries {
    pub fn table(&self) -> ThresholdTable {
        self.0.iter().cloned().collect()
    }
}

impl<'de> Deserialize<'de> for StateEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = StateEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of state names to integer thresholds")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, threshold)) = map.next_entry::<String, i64>()? {
                    entries.push((name, threshold));
                }
                Ok(StateEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn default_interval() -> f64 {
    1.0
}

fn default_stat_file() -> PathBuf {
    PathBuf::from(DEFAULT_STAT_FILE)
}

fn default_fps_low() -> f64 {
    DEFAULT_FPS_LOW
}

fn default_fps_high() -> f64 {
    DEFAULT_FPS_HIGH
}

fn default_sample_rate() -> f64 {
    DEFAULT_SAMPLE_RATE
}

fn default_idle_delay() -> f64 {
    1.0
}

fn default_zoo_size() -> usize {
    3
}

fn default_meminfo() -> PathBuf {
    PathBuf::from(DEFAULT_MEMINFO_FILE)
}

fn default_temperature() -> PathBuf {
    PathBuf::from(DEFAULT_THERMAL_FILE)
}

fn default_charge_now() -> PathBuf {
    PathBuf::from("/sys/class/power_supply/BAT1/charge_now")
}

fn default_charge_full() -> PathBuf {
    PathBuf::from("/sys/class/power_supply/BAT1/charge_full")
}

fn default_ac_online() -> PathBuf {
    PathBuf::from("/sys/class/power_supply/ACAD/online")
}

fn default_max_bps() -> f64 {
    DEFAULT_MAX_BPS
}

impl ModuleConfig {
    /// Load the module file from `dir`, then apply environment overrides
    ///
    /// A missing file means defaults; a malformed one is an error. File keys
    /// keep their case, so state and subject names reach the output as
    /// written.
    pub fn load(dir: &Path, kind: MetricKind) -> Result<Self> {
        Self::load_with_env(dir, kind, environment())
    }

    fn load_with_env(dir: &Path, kind: MetricKind, env: config::Environment) -> Result<Self> {
        let path = dir.join(kind.config_file());
        let mut layered = read_json(&path)?;

        let overrides: Value = config::Config::builder()
            .add_source(env)
            .build()
            .and_then(|config| config.try_deserialize())
            .context("Invalid environment override")?;
        merge(&mut layered, overrides);

        serde_json::from_value(layered)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn sample_interval(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.cpu.interval)
            .with_context(|| format!("Invalid sampling interval {}", self.cpu.interval))
    }

    pub fn bandwidth_file(&self, config_dir: &Path) -> PathBuf {
        self.sources
            .bandwidth
            .clone()
            .unwrap_or_else(|| config_dir.join("bw.log"))
    }
}

/// `RUNCAT__SECTION__KEY` variables, values parsed as numbers or booleans
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Parse a JSON file; a missing file is an empty object
fn read_json(path: &Path) -> Result<Value> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Value::Object(Map::new())),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Overlay `overrides` onto `base`, recursing into objects
fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, value) => *base = value,
    }
}

/// User-level subject selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserConfig {
    /// Module name to subject name
    #[serde(default)]
    pub animal: HashMap<String, String>,
}

impl UserConfig {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(USER_CONFIG_FILE);

        serde_json::from_value(read_json(&path)?)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Subject for a module; the special modules default to their own picture
    pub fn subject_for(&self, kind: MetricKind) -> String {
        if let Some(subject) = self.animal.get(kind.module_name()) {
            return subject.clone();
        }
        match kind {
            MetricKind::Battery | MetricKind::Bandwidth => kind.module_name().to_string(),
            _ => runcat_lib::subjects::DEFAULT_SUBJECT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ModuleConfig::load(dir.path(), MetricKind::Ram).unwrap();

        assert_eq!(config.cpu.interval, 1.0);
        assert_eq!(config.cpu.stat_file, PathBuf::from("/proc/stat"));
        assert!(config.cpu.states.0.is_empty());
        assert_eq!(config.ui.fps_l, 6.0);
        assert_eq!(config.ui.fps_h, 90.0);
        assert!(!config.ui.strict_fps_check);
        assert_eq!(config.zoo_size, 3);
        assert!(config.icons.is_none());
        assert_eq!(config.bandwidth_file(dir.path()), dir.path().join("bw.log"));
    }

    #[test]
    fn test_load_module_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config_temp.json"),
            r#"{
                "tooltip-format": "{percentage}°C",
                "return-type": "json",
                "cpu": {
                    "interval": 2,
                    "states": { "hot": 80, "cool": 0, "warm": 50 }
                },
                "ui": { "fps_l": 4, "fps_h": 60, "strict-fps-check": true },
                "sources": { "temperature": "/tmp/zone/temp" }
            }"#,
        )
        .unwrap();

        let config = ModuleConfig::load(dir.path(), MetricKind::Temperature).unwrap();

        assert_eq!(config.tooltip_format, "{percentage}°C");
        assert_eq!(config.return_type.as_deref(), Some("json"));
        assert_eq!(config.sample_interval().unwrap(), Duration::from_secs(2));
        assert_eq!(
            config.cpu.states.0,
            vec![
                ("hot".to_string(), 80),
                ("cool".to_string(), 0),
                ("warm".to_string(), 50)
            ]
        );
        assert_eq!(config.cpu.states.table().classify(60), "warm");
        assert_eq!(config.ui.fps_l, 4.0);
        assert!(config.ui.strict_fps_check);
        assert_eq!(config.sources.temperature, PathBuf::from("/tmp/zone/temp"));
    }

    #[test]
    fn test_names_keep_their_case() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{
                "cpu": { "states": { "Cool": 0, "Hot": 80 } },
                "subjects": { "Owl": [57856, 57859] }
            }"#,
        )
        .unwrap();

        let config = ModuleConfig::load(dir.path(), MetricKind::Cpu).unwrap();

        assert_eq!(config.cpu.states.table().classify(90), "Hot");
        assert_eq!(config.cpu.states.table().classify(10), "Cool");
        assert!(config.subjects.contains_key("Owl"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config_ram.json"),
            r#"{ "ui": { "fps_l": 4 }, "cpu": { "interval": 2, "states": { "Low": 0 } } }"#,
        )
        .unwrap();

        let mut vars = config::Map::new();
        vars.insert("RUNCAT__UI__FPS_L".to_string(), "3".to_string());
        vars.insert("RUNCAT__CPU__INTERVAL".to_string(), "5".to_string());
        vars.insert("RUNCAT_CONFIG_DIR".to_string(), "/elsewhere".to_string());
        let env = environment().source(Some(vars));

        let config = ModuleConfig::load_with_env(dir.path(), MetricKind::Ram, env).unwrap();

        assert_eq!(config.ui.fps_l, 3.0);
        assert_eq!(config.ui.fps_h, 90.0);
        assert_eq!(config.sample_interval().unwrap(), Duration::from_secs(5));
        assert_eq!(config.cpu.states.0, vec![("Low".to_string(), 0)]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        assert!(ModuleConfig::load(dir.path(), MetricKind::Cpu).is_err());
    }

    #[test]
    fn test_icons_forms() {
        let glyphs: Icons = serde_json::from_str(r#""ab""#).unwrap();
        assert_eq!(glyphs.frames(), vec!["a", "b"]);

        let frames: Icons = serde_json::from_str(r#"["xx", "yy"]"#).unwrap();
        assert_eq!(frames.frames(), vec!["xx", "yy"]);
    }

    #[test]
    fn test_user_config_subjects() {
        let dir = TempDir::new().unwrap();
        let user = UserConfig::load(dir.path()).unwrap();
        assert_eq!(user.subject_for(MetricKind::Cpu), "cat");
        assert_eq!(user.subject_for(MetricKind::Battery), "eiffel");

        std::fs::write(
            dir.path().join("user_conf.json"),
            r#"{ "animal": { "ram": "parrot" } }"#,
        )
        .unwrap();
        let user = UserConfig::load(dir.path()).unwrap();
        assert_eq!(user.subject_for(MetricKind::Ram), "parrot");
        assert_eq!(user.subject_for(MetricKind::Temperature), "cat");
    }
}
