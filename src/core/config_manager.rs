// src/core/config_manager.rs
//! Configuration: where state lives on disk, and the user settings file.

use crate::core::FsOps;
use crate::job_analysis::CandidateProfile;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PREFERENCES: &str = "Remote work preferred\nWork-life balance important\nCompetitive salary expected\nGrowth opportunities valued";

const SETTINGS_FILE: &str = "settings.toml";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub paths: StoragePaths,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub base_dir: PathBuf,
    pub settings_path: PathBuf,
    pub history_path: PathBuf,
}

impl StoragePaths {
    pub fn in_dir(base_dir: PathBuf) -> Self {
        Self {
            settings_path: base_dir.join(SETTINGS_FILE),
            history_path: base_dir.join(HISTORY_FILE),
            base_dir,
        }
    }

    pub fn with_overrides(
        mut self,
        settings_path: Option<PathBuf>,
        history_path: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = settings_path {
            self.settings_path = path;
        }
        if let Some(path) = history_path {
            self.history_path = path;
        }
        self
    }
}

impl ConfigManager {
    /// Resolve the environment and storage paths from the process environment.
    pub fn load() -> Result<Self> {
        let environment = std::env::var("JOBFIT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string());
        info!("Loading configuration for environment: {}", environment);

        let base_dir = match std::env::var_os("JOBFIT_HOME") {
            Some(home) => PathBuf::from(home),
            None if environment == "production" => PathBuf::from("/app"),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        let paths = StoragePaths::in_dir(base_dir).with_overrides(
            std::env::var_os("JOBFIT_SETTINGS").map(PathBuf::from),
            std::env::var_os("JOBFIT_HISTORY").map(PathBuf::from),
        );

        Ok(Self { environment, paths })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            environment: "local".to_string(),
            paths: StoragePaths::in_dir(base_dir),
        }
    }

    pub async fn load_settings(&self) -> Result<Settings> {
        Settings::load(&self.paths.settings_path).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        settings.save(&self.paths.settings_path).await
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.paths.base_dir).await?;
        for path in [&self.paths.settings_path, &self.paths.history_path] {
            if let Some(parent) = path.parent() {
                FsOps::ensure_dir_exists(parent).await?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resume_text: String,
    pub preferences_text: String,
    pub webhook: WebhookSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resume_text: String::new(),
            preferences_text: DEFAULT_PREFERENCES.to_string(),
            webhook: WebhookSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    pub auto_send: bool,
    pub timeout_seconds: u64,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            url: None,
            auth: None,
            auto_send: false,
            timeout_seconds: 10,
        }
    }
}

impl Settings {
    /// Missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        if !FsOps::file_exists(path).await {
            info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = FsOps::read_file_safe(path).await?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        FsOps::write_file_safe(path, &content).await
    }

    pub fn candidate_profile(&self) -> CandidateProfile {
        CandidateProfile::new(self.resume_text.as_str(), self.preferences_text.as_str())
    }
}
