use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::system::{bandwidth, latency};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub latency: LatencyConfig,
    pub thresholds: ThresholdsConfig,
    pub updates: UpdatesConfig,
    pub bandwidth: BandwidthConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_file: PathBuf,
    pub log_level: String,
    pub output: PathBuf,
    pub color: bool,
    pub disk_mount: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            log_file: PathBuf::from("system_analyzer.log"),
            log_level: "info".to_string(),
            output: PathBuf::from("results.json"),
            color: true,
            disk_mount: PathBuf::from("/"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    /// ask, continue, retry or abort
    pub on_unreachable: String,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        LatencyConfig {
            enabled: true,
            timeout_secs: latency::DEFAULT_TIMEOUT.as_secs(),
            on_unreachable: "ask".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        ThresholdsConfig {
            cpu: 75.0,
            memory: 75.0,
            disk: 75.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
    pub enabled: bool,
    /// ask, yes or no
    pub apply: String,
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        UpdatesConfig {
            enabled: true,
            apply: "ask".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BandwidthConfig {
    /// ask, yes or no
    pub run: String,
    pub command: String,
    pub timeout_secs: u64,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        BandwidthConfig {
            run: "ask".to_string(),
            command: "speedtest-cli".to_string(),
            timeout_secs: bandwidth::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub desktop: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        NotificationsConfig {
            enabled: true,
            desktop: true,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("system-analyzer").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
