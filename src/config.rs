//! Application configuration
//!
//! Everything here has a sensible default, so a missing or partial config
//! file is fine. The tilt thresholds were tuned by hand on a couple of phones
//! and are expected to need calibration on other hardware.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LibraryError, Result};

/// Top-level configuration loaded from `config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite catalog location (defaults to the user data directory)
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Where uploaded images are written (defaults to the user cache directory)
    #[serde(default)]
    pub object_store_dir: Option<PathBuf>,
    /// Number of photos shown per category leaderboard
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    /// Motion sensor thresholds and timings
    #[serde(default)]
    pub sensor: SensorConfig,
}

fn default_leaderboard_size() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            object_store_dir: None,
            leaderboard_size: default_leaderboard_size(),
            sensor: SensorConfig::default(),
        }
    }
}

/// Thresholds (m/s²) and timings (ms) for the orientation classifier
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// `|y|` above this means the device is held upright
    pub vertical_threshold: f64,
    /// `|x|` above this means a sideways tilt
    pub tilt_threshold: f64,
    /// `|z|` above this means the device lies flat
    pub horizontal_threshold: f64,
    /// Tilts are ignored for this long after the last vertical reading
    pub vertical_guard_ms: u64,
    /// Sensor sampling interval
    pub sample_interval_ms: u64,
    /// Change events are suppressed for this long after the first sample
    pub settling_ms: u64,
    /// How long to wait for a first sample before declaring the sensor absent
    pub probe_timeout_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            vertical_threshold: 7.0,
            tilt_threshold: 3.0,
            horizontal_threshold: 8.0,
            vertical_guard_ms: 500,
            sample_interval_ms: 100,
            settling_ms: 1000,
            probe_timeout_ms: 1000,
        }
    }
}

impl SensorConfig {
    pub fn vertical_guard(&self) -> Duration {
        Duration::from_millis(self.vertical_guard_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        // A zero interval would make tokio's interval panic
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn settling(&self) -> Duration {
        Duration::from_millis(self.settling_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// `~/.config/kinetic-viewer/config.json` on Linux
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("kinetic-viewer");
        path.push("config.json");
        Some(path)
    }

    /// Resolve the catalog database path.
    ///
    /// - Linux: ~/.local/share/kinetic-viewer/kinetic_viewer.db
    /// - macOS: ~/Library/Application Support/kinetic-viewer/kinetic_viewer.db
    /// - Windows: %APPDATA%\kinetic-viewer\kinetic_viewer.db
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(LibraryError::NoDirectory("the catalog database"))?;
        path.push("kinetic-viewer");
        path.push("kinetic_viewer.db");
        Ok(path)
    }

    /// Resolve the object store directory (~/.cache/kinetic-viewer/images on Linux)
    pub fn object_store_dir(&self) -> Result<PathBuf> {
        if let Some(path) = &self.object_store_dir {
            return Ok(path.clone());
        }
        let mut path = dirs::cache_dir()
            .or_else(dirs::home_dir)
            .ok_or(LibraryError::NoDirectory("the object store"))?;
        path.push("kinetic-viewer");
        path.push("images");
        Ok(path)
    }
}
