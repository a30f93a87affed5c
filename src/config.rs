/// Configuration module for mainframe-lens.
///
/// Handles loading, validating, and providing default configuration values,
/// plus the directory layout derived from them.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const ANALYSIS_FILE_NAME: &str = "cobol_analysis.json";

// ── Default value functions ──────────────────────────────────────────

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Config struct ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Root under which each project's sources live in `<upload_dir>/<project_id>/`
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Root for generated artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and, for the
    /// default path only, writes a template next to the binary's cwd.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == DEFAULT_CONFIG_PATH {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.upload_dir.trim().is_empty(), "upload_dir must be set");
        anyhow::ensure!(!self.output_dir.trim().is_empty(), "output_dir must be set");
        anyhow::ensure!(!self.log_level.trim().is_empty(), "log_level must be set");
        Ok(())
    }

    /// `<upload_dir>/<project_id>`. The id is not validated here.
    #[must_use]
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        Path::new(&self.upload_dir).join(project_id)
    }

    /// `<output_dir>/analysis/<project_id>/cobol_analysis.json`
    #[must_use]
    pub fn analysis_path(&self, project_id: &str) -> PathBuf {
        Path::new(&self.output_dir)
            .join("analysis")
            .join(project_id)
            .join(ANALYSIS_FILE_NAME)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
