//! User-facing alert list: the read model over the alert store.
//!
//! This is the only writer of the store. Every mutation updates the in-memory
//! list and then writes the whole record before returning.

use std::collections::HashSet;

use super::model::{demo_alerts, Alert};
use super::store::AlertStore;

pub struct AlertList {
    store: AlertStore,
    /// Most-recent-first
    alerts: Vec<Alert>,
    /// Ids dismissed during this session; never accepted again
    dismissed: HashSet<String>,
}

impl AlertList {
    /// Open the list from the store.
    ///
    /// When nothing has been persisted yet, the demo set is seeded (and saved)
    /// if `seed_demo` is set, otherwise the list starts empty.
    pub fn open(store: AlertStore, seed_demo: bool) -> Self {
        let (alerts, seeded) = match store.load() {
            Some(alerts) => (alerts, false),
            None if seed_demo => (demo_alerts(), true),
            None => (Vec::new(), false),
        };

        let list = Self {
            store,
            alerts,
            dismissed: HashSet::new(),
        };
        if seeded {
            log::info!("No saved alerts found, seeded {} demo alerts", list.alerts.len());
            list.persist();
        }
        list
    }

    pub fn list(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn unread_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_read).count()
    }

    /// Mark an alert as read. Unknown ids are ignored.
    pub fn mark_read(&mut self, id: &str) {
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == id) else {
            return;
        };
        if alert.is_read {
            return;
        }
        alert.is_read = true;
        self.persist();
    }

    /// Remove an alert permanently. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: &str) {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        if self.alerts.len() == before {
            return;
        }
        self.dismissed.insert(id.to_string());
        self.persist();
    }

    /// Add a new alert to the front of the list and persist it.
    ///
    /// Returns the stored alert, or `None` when the id is already present or was
    /// dismissed earlier in this session.
    pub fn ingest(&mut self, alert: Alert) -> Option<&Alert> {
        if !alert.is_valid() {
            log::warn!("Rejecting alert without an id: {}", alert.title);
            return None;
        }
        if self.dismissed.contains(&alert.id) {
            log::warn!("Rejecting alert {}: it was already dismissed", alert.id);
            return None;
        }
        if self.get(&alert.id).is_some() {
            log::debug!("Ignoring duplicate alert {}", alert.id);
            return None;
        }

        self.alerts.insert(0, alert);
        self.persist();
        self.alerts.first()
    }

    /// Write the current list. Failures are logged and the in-memory state is kept;
    /// the next successful write brings the record back in line.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.alerts) {
            log::error!("Failed to persist alerts to {:?}: {}", self.store.record_path(), e);
        }
    }
}
