//! Persistent storage for alerts.
//!
//! Stores the alert feed as a single JSON record in the app data directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::model::Alert;
use crate::core::error::StoreError;

const RECORD_NAME: &str = "beacon_alerts.json";

/// Durable alert record, most-recent-first.
pub struct AlertStore {
    /// Directory holding the record file
    data_dir: PathBuf,
}

impl AlertStore {
    /// Create a new alert store.
    ///
    /// # Arguments
    /// * `data_dir` - The app data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Get the path to the alert record.
    pub fn record_path(&self) -> PathBuf {
        self.data_dir.join(RECORD_NAME)
    }

    /// Load the persisted alerts.
    ///
    /// Returns `None` when there is no usable record yet (missing file, unreadable
    /// file, or a top-level value that is not a list). Individual records that fail
    /// validation are dropped, as are later duplicates of an id.
    pub fn load(&self) -> Option<Vec<Alert>> {
        let path = self.record_path();
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read alert record {:?}: {}", path, e);
                return None;
            }
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Alert record {:?} is malformed, ignoring it: {}", path, e);
                return None;
            }
        };

        let mut seen = HashSet::new();
        let mut alerts = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Alert>(record) {
                Ok(alert) if alert.is_valid() => {
                    if seen.insert(alert.id.clone()) {
                        alerts.push(alert);
                    } else {
                        log::warn!("Dropping duplicate alert id {} at index {}", alert.id, index);
                    }
                }
                Ok(_) => log::warn!("Dropping alert at index {}: empty id", index),
                Err(e) => log::warn!("Dropping malformed alert at index {}: {}", index, e),
            }
        }

        Some(alerts)
    }

    /// Save the alerts, replacing the previous record.
    ///
    /// The record is written to a sibling temp file and renamed into place, so a
    /// later `load` sees either the old record or the new one.
    pub fn save(&self, alerts: &[Alert]) -> Result<(), StoreError> {
        // Ensure directory exists
        fs::create_dir_all(&self.data_dir)?;

        let path = self.record_path();
        let tmp_path = temp_path(&path);
        let content = serde_json::to_string_pretty(alerts)?;
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &path)?;

        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::model::{demo_alerts, Severity};
    use tempfile::tempdir;

    #[test]
    fn test_store_save_and_load() {
        let dir = tempdir().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());

        let mut alerts = demo_alerts();
        alerts[1].is_read = true;
        store.save(&alerts).unwrap();

        // Fresh store, same directory
        let store2 = AlertStore::new(dir.path().to_path_buf());
        let loaded = store2.load().unwrap();

        assert_eq!(loaded.len(), alerts.len());
        for (saved, restored) in alerts.iter().zip(&loaded) {
            assert_eq!(saved.id, restored.id);
            assert_eq!(saved.severity, restored.severity);
            assert_eq!(saved.is_read, restored.is_read);
            assert_eq!(saved.created_at, restored.created_at);
        }
    }

    #[test]
    fn test_missing_record_is_no_data() {
        let dir = tempdir().unwrap();
        let store = AlertStore::new(dir.path().join("not-yet-created"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_malformed_record_is_no_data() {
        let dir = tempdir().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        fs::write(store.record_path(), "{ not json").unwrap();
        assert!(store.load().is_none());

        fs::write(store.record_path(), r#"{"alerts": []}"#).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_invalid_records_are_dropped() {
        let dir = tempdir().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        let content = r#"[
            {"id": "ok", "type": "warning", "title": "Flood Warning", "message": "Avoid travel",
             "location": "Pune", "timestamp": "2025-01-01T12:00:00Z", "isRead": false},
            {"id": "bad-type", "type": "apocalyptic", "title": "x", "message": "x",
             "location": "x", "timestamp": "2025-01-01T12:00:00Z", "isRead": false},
            {"id": "bad-time", "type": "info", "title": "x", "message": "x",
             "location": "x", "timestamp": "yesterday", "isRead": false},
            {"id": "", "type": "info", "title": "x", "message": "x",
             "location": "x", "timestamp": "2025-01-01T12:00:00Z", "isRead": false},
            {"id": "ok", "type": "info", "title": "dup", "message": "x",
             "location": "x", "timestamp": "2025-01-01T12:00:00Z", "isRead": true},
            42
        ]"#;
        fs::write(store.record_path(), content).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "ok");
        assert_eq!(loaded[0].severity, Severity::Warning);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        store.save(&demo_alerts()).unwrap();
        store.save(&[]).unwrap();

        assert!(!temp_path(&store.record_path()).exists());
        assert_eq!(store.load().unwrap().len(), 0);
    }
}
