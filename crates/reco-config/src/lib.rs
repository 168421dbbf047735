//! Configuration loading and parsing.
//!
//! Grounded in `core-config`: a `discover()`/`load_from(path)` pair backed
//! by `toml` + `serde`, tolerant of missing files and parse errors (falls
//! back to defaults rather than erroring the whole process), with
//! `#[serde(default)]` on every section so unknown or partial config files
//! degrade gracefully instead of failing deserialization.

use anyhow::Result;
use reco_runner::Thresholds;
use reco_scheduler::ScheduleConfig;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ScheduleFileConfig {
    #[serde(default = "ScheduleFileConfig::default_realtime_ms")]
    pub realtime_ms: u64,
    #[serde(default = "ScheduleFileConfig::default_commit_after_ms")]
    pub commit_after_ms: u64,
}

impl ScheduleFileConfig {
    const fn default_realtime_ms() -> u64 {
        150
    }
    const fn default_commit_after_ms() -> u64 {
        700
    }
}

impl Default for ScheduleFileConfig {
    fn default() -> Self {
        Self {
            realtime_ms: Self::default_realtime_ms(),
            commit_after_ms: Self::default_commit_after_ms(),
        }
    }
}

impl From<ScheduleFileConfig> for ScheduleConfig {
    fn from(file: ScheduleFileConfig) -> Self {
        ScheduleConfig {
            realtime_ms: file.realtime_ms,
            commit_after_ms: file.commit_after_ms,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ThresholdFileConfig {
    #[serde(default = "ThresholdFileConfig::default_realtime")]
    pub realtime: f64,
    #[serde(default = "ThresholdFileConfig::default_commit")]
    pub commit: f64,
}

impl ThresholdFileConfig {
    const fn default_realtime() -> f64 {
        0.8
    }
    const fn default_commit() -> f64 {
        0.5
    }
}

impl Default for ThresholdFileConfig {
    fn default() -> Self {
        Self { realtime: Self::default_realtime(), commit: Self::default_commit() }
    }
}

impl From<ThresholdFileConfig> for Thresholds {
    fn from(file: ThresholdFileConfig) -> Self {
        Thresholds { realtime: file.realtime, commit: file.commit }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct WindowFileConfig {
    #[serde(default = "WindowFileConfig::default_size")]
    pub size: usize,
}

impl WindowFileConfig {
    const fn default_size() -> usize {
        500
    }
}

impl Default for WindowFileConfig {
    fn default() -> Self {
        Self { size: Self::default_size() }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub schedule: ScheduleFileConfig,
    #[serde(default)]
    pub threshold: ThresholdFileConfig,
    #[serde(default)]
    pub window: WindowFileConfig,
}

/// Loaded and resolved configuration, ready to hand to the engine's
/// constituent components (`reco-core::Recognizer::new`'s config shape,
/// spec.md §6: `plugins`, `schedule?`, `thresholds?`, `windowSize?`).
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self { raw: None, file: ConfigFile::default() }
    }
}

impl RecognizerConfig {
    pub fn schedule(&self) -> ScheduleConfig {
        self.file.schedule.into()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.file.threshold.into()
    }

    pub fn window_size(&self) -> usize {
        self.file.window.size
    }
}

/// Best-effort config path following platform conventions: a local
/// `recognizer.toml` in the working directory takes precedence over the
/// platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("recognizer.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("recognizer").join("recognizer.toml");
    }
    PathBuf::from("recognizer.toml")
}

/// Loads configuration from `path`, or from [`discover`] when `path` is
/// `None`. Missing files and parse errors both fall back to
/// [`Config::default`] rather than failing the caller — a malformed config
/// should degrade the engine's tuning, not stop it from running.
pub fn load_from(path: Option<PathBuf>) -> Result<RecognizerConfig> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(RecognizerConfig { raw: Some(content), file }),
            Err(e) => {
                tracing::warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
                Ok(RecognizerConfig::default())
            }
        }
    } else {
        info!(target: "config", path = %path.display(), "config_not_found_using_defaults");
        Ok(RecognizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_recognizer_config__.toml"))).unwrap();
        assert_eq!(cfg.file.schedule.realtime_ms, 150);
        assert_eq!(cfg.file.schedule.commit_after_ms, 700);
        assert_eq!(cfg.file.threshold.realtime, 0.8);
        assert_eq!(cfg.file.threshold.commit, 0.5);
        assert_eq!(cfg.file.window.size, 500);
    }

    #[test]
    fn parses_partial_overrides() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[schedule]\nrealtime_ms = 50\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.schedule.realtime_ms, 50);
        assert_eq!(cfg.file.schedule.commit_after_ms, 700);
    }

    #[test]
    fn parses_full_file_and_converts_to_component_configs() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[schedule]\nrealtime_ms = 100\ncommit_after_ms = 500\n\
             [threshold]\nrealtime = 0.9\ncommit = 0.6\n\
             [window]\nsize = 40\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();

        let schedule = cfg.schedule();
        assert_eq!(schedule.realtime_ms, 100);
        assert_eq!(schedule.commit_after_ms, 500);

        let thresholds = cfg.thresholds();
        assert_eq!(thresholds.realtime, 0.9);
        assert_eq!(thresholds.commit, 0.6);

        assert_eq!(cfg.window_size(), 40);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "this is not valid toml {{{").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.schedule.realtime_ms, 150);
    }
}
