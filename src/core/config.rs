use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use super::alerts::dispatch::DispatchPolicy;
use super::alerts::feed::FeedConfig;
use super::notify::PermissionState;

/// Application settings, persisted in settings.json.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where the alert record and the signed-in user record live
    pub data_dir: PathBuf,
    pub feed_interval_seconds: u64,
    /// Chance per feed tick of a new alert
    pub alert_probability: f64,
    /// How long a non-critical push stays on screen
    pub push_auto_dismiss_seconds: u64,
    /// Seed the demo alerts when nothing has been saved yet
    pub seed_demo_alerts: bool,
    /// Last answer to the push permission prompt
    pub notification_permission: PermissionState,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_base_dir().join(".local/share/beacon"),
            feed_interval_seconds: 30,
            alert_probability: 0.1,
            push_auto_dismiss_seconds: 10,
            seed_demo_alerts: true,
            notification_permission: PermissionState::Unasked,
        }
    }
}

impl Settings {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig::new(Duration::from_secs(self.feed_interval_seconds), self.alert_probability)
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            auto_dismiss_after: Duration::from_secs(self.push_auto_dismiss_seconds),
        }
    }
}

fn default_base_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

/// Config directory: `BEACON_CONFIG_DIR`, or `~/.config/beacon`.
pub fn default_config_dir() -> PathBuf {
    std::env::var_os("BEACON_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_base_dir().join(".config/beacon"))
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                match serde_json::from_str(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Ignoring malformed {:?}: {}", self.config_path, e),
                }
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());

        let default = manager.load();
        assert_eq!(default.feed_interval_seconds, 30);
        assert_eq!(default.notification_permission, PermissionState::Unasked);

        let new_settings = Settings {
            data_dir: PathBuf::from("/tmp/beacon"),
            feed_interval_seconds: 5,
            notification_permission: PermissionState::Granted,
            ..Settings::default()
        };

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded, new_settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(dir.path().join("settings.json"), r#"{"alert_probability": 0.5}"#).unwrap();

        let loaded = manager.load();
        assert_eq!(loaded.alert_probability, 0.5);
        assert_eq!(loaded.push_auto_dismiss_seconds, 10);
        assert!(loaded.seed_demo_alerts);
    }

    #[test]
    fn test_derived_configs() {
        let settings = Settings {
            feed_interval_seconds: 12,
            alert_probability: 2.0,
            push_auto_dismiss_seconds: 3,
            ..Settings::default()
        };
        let feed = settings.feed_config();
        assert_eq!(feed.interval, Duration::from_secs(12));
        assert_eq!(feed.probability, 1.0);
        assert_eq!(settings.dispatch_policy().auto_dismiss_after, Duration::from_secs(3));
    }
}
