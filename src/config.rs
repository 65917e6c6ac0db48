//! Startup configuration
//!
//! A static set of options read once from a JSON file. Every field has a
//! default so a partial (or missing) file is fine for bench setups.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of playable audio files.
    pub music_directory: PathBuf,
    /// GPIO line of the coin acceptor on cabinet builds.
    pub coin_pin: u8,
    /// Color label for the indicator strip.
    pub indicator_color: String,
    /// Grant every selection without consuming credits.
    pub free_play: bool,
    /// Seconds between playback-busy polls.
    pub poll_interval_secs: u64,
    /// Seconds the credit-acknowledgement pulse stays lit.
    pub pulse_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_directory: PathBuf::from("music"),
            coin_pin: 3,
            indicator_color: "amber".to_string(),
            free_play: false,
            poll_interval_secs: 1,
            pulse_secs: 5,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn credit_pulse(&self) -> Duration {
        Duration::from_secs(self.pulse_secs)
    }
}
