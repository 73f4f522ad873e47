// Configuration Storage Service
// Reads and writes config.json, keeping a short history of previous versions

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::services::detection::aggregation::{sanitize_threshold, DEFAULT_THRESHOLD};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Overrides the default location of the calibration profile file.
    #[serde(default)]
    pub profiles_file: Option<PathBuf>,
}

/// Keys accepted by [`AppConfig::set`].
pub const CONFIG_KEYS: &[&str] = &["threshold", "normalize-punctuation", "profiles-file"];

impl AppConfig {
    /// Update one setting from its command-line spelling.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "threshold" => {
                let threshold: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("threshold must be a number, got {:?}", value))?;
                if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                    return Err(format!("threshold must be within [0, 1], got {}", value));
                }
                self.detection.threshold = threshold;
            }
            "normalize-punctuation" => {
                self.detection.normalize_punctuation = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(format!("normalize-punctuation must be true or false, got {:?}", value)),
                };
            }
            "profiles-file" => {
                let value = value.trim();
                self.profiles_file = if value.is_empty() || value == "default" {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => {
                return Err(format!(
                    "unknown config key {:?} (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                ))
            }
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            detection: DetectionConfig::default(),
            profiles_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_true")]
    pub normalize_punctuation: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            normalize_punctuation: true,
        }
    }
}

impl DetectionConfig {
    /// Threshold ready for the pipeline (finite, within [0, 1]).
    pub fn effective_threshold(&self) -> f64 {
        sanitize_threshold(self.threshold)
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_threshold() -> f64 { DEFAULT_THRESHOLD }
fn default_true() -> bool { true }

const MAX_BACKUPS: usize = 10;

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory (`SIGNALCHECK_CONFIG_DIR` wins when set)
    pub fn default_config_dir() -> Option<PathBuf> {
        match std::env::var("SIGNALCHECK_CONFIG_DIR") {
            Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p)),
            _ => dirs::config_dir().map(|p| p.join("signalcheck")),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Write `config`, first copying any existing file into `backups/`.
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;
        if self.config_file.exists() {
            self.backup_current()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))?;
        info!("[CONFIG] Saved {}", self.config_file.display());
        Ok(())
    }

    /// Profile file location: the configured override, else next to config.json.
    pub fn profiles_path(&self, config: &AppConfig) -> PathBuf {
        config
            .profiles_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join("profiles.json"))
    }

    fn backup_dir(&self) -> PathBuf {
        self.config_dir.join("backups")
    }

    /// Copy config.json to `backups/config_<timestamp>.json` and prune the
    /// directory down to the newest `MAX_BACKUPS` files.
    fn backup_current(&self) -> Result<(), String> {
        let dir = self.backup_dir();
        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%6f");
        fs::copy(&self.config_file, dir.join(format!("config_{}.json", stamp)))
            .map_err(|e| format!("Failed to back up config: {}", e))?;

        // Timestamped names sort chronologically.
        let mut names: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy())
                    .is_some_and(|n| n.starts_with("config_") && n.ends_with(".json"))
            })
            .collect();
        names.sort();
        let excess = names.len().saturating_sub(MAX_BACKUPS);
        for old in names.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&old) {
                warn!("[CONFIG] Could not prune backup {}: {}", old.display(), e);
            }
        }
        Ok(())
    }
}
