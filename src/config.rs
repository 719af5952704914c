use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::constants::{LOOKAHEAD_THRESHOLD, PROGRESS_REPORT_INTERVAL};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seconds of media time between progress reports.
    #[serde(default = "default_report_interval_secs")]
    pub progress_report_interval_secs: u64,

    /// Remaining seconds of the current item below which the next one gets
    /// resolved.
    #[serde(default = "default_lookahead_threshold_secs")]
    pub lookahead_threshold_secs: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_report_interval_secs: default_report_interval_secs(),
            lookahead_threshold_secs: default_lookahead_threshold_secs(),
        }
    }
}

impl PlaybackConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.progress_report_interval_secs)
    }

    pub fn lookahead_threshold(&self) -> Duration {
        Duration::from_secs(self.lookahead_threshold_secs)
    }
}

fn default_report_interval_secs() -> u64 {
    PROGRESS_REPORT_INTERVAL.as_secs()
}

fn default_lookahead_threshold_secs() -> u64 {
    LOOKAHEAD_THRESHOLD.as_secs()
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("playhead")
            .join("config.toml")
    }

    /// Load the config file, falling back to defaults when it doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}
