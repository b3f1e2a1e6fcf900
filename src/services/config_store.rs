// Configuration Storage Service
// Handles detector settings read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::detection::DEFAULT_MAX_CONCURRENCY;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub settings: DetectorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorSettings {
    #[serde(default = "default_true")]
    pub auto_analyze: bool,
    #[serde(default = "default_true")]
    pub show_notifications: bool,
    #[serde(default = "default_analysis_threshold")]
    pub analysis_threshold: f64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            auto_analyze: true,
            show_notifications: true,
            analysis_threshold: 0.7,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl DetectorSettings {
    /// Whether a page-level probability warrants a user notification
    pub fn should_notify(&self, ai_probability: f64) -> bool {
        self.show_notifications && ai_probability >= self.analysis_threshold
    }
}

fn default_true() -> bool { true }
fn default_analysis_threshold() -> f64 { 0.7 }
fn default_max_concurrency() -> usize { DEFAULT_MAX_CONCURRENCY }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("visualAI"))
    }

    /// Store rooted at the default config directory, falling back to `./config`
    pub fn open_default() -> Self {
        Self::new(Self::default_config_dir().unwrap_or_else(|| PathBuf::from("config")))
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

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; names embed the timestamp
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    pub fn get_settings(&self) -> Result<DetectorSettings, String> {
        Ok(self.load()?.settings)
    }

    pub fn update_settings(&self, settings: DetectorSettings) -> Result<(), String> {
        let mut config = self.load()?;
        if config.version.is_empty() {
            config.version = env!("CARGO_PKG_VERSION").to_string();
        }
        config.settings = settings;
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (ConfigStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("visualai-test-{}", uuid::Uuid::new_v4()));
        (ConfigStore::new(dir.clone()), dir)
    }

    #[test]
    fn test_default_settings() {
        let settings = DetectorSettings::default();
        assert!(settings.auto_analyze);
        assert!(settings.show_notifications);
        assert_eq!(settings.analysis_threshold, 0.7);
        assert!(settings.should_notify(0.7));
        assert!(!settings.should_notify(0.69));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let parsed: DetectorSettings = serde_json::from_str(r#"{"autoAnalyze":false}"#).unwrap();
        assert!(!parsed.auto_analyze);
        assert!(parsed.show_notifications);
        assert_eq!(parsed.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    }

    #[test]
    fn test_missing_file_loads_default() {
        let (store, _dir) = temp_store();
        let config = store.load().unwrap();
        assert_eq!(config.settings, DetectorSettings::default());
    }

    #[test]
    fn test_settings_round_trip_with_backup() {
        let (store, dir) = temp_store();
        let mut settings = DetectorSettings::default();
        settings.analysis_threshold = 0.5;
        store.update_settings(settings.clone()).unwrap();

        settings.show_notifications = false;
        store.update_settings(settings.clone()).unwrap();

        assert_eq!(store.get_settings().unwrap(), settings);
        assert!(dir.join("backups").read_dir().unwrap().count() >= 1);

        let _ = fs::remove_dir_all(dir);
    }
}
