use std::sync::Arc;

use super::alerts::dispatch::{Delivery, DispatchPolicy, Notifier, Toast, ToastVariant};
use super::alerts::list::AlertList;
use super::alerts::model::Alert;
use super::alerts::store::AlertStore;
use super::notify::gate::PermissionGate;
use super::notify::{NotificationHost, PermissionState};

/// Owner of the alert pipeline: list controller, permission gate and notifier.
///
/// All mutations go through here on a single task; the gate is shared so a
/// permission prompt can run without blocking the owner.
pub struct AlertCenter {
    alerts: AlertList,
    gate: Arc<PermissionGate>,
    notifier: Notifier,
}

impl AlertCenter {
    pub fn new(
        store: AlertStore,
        host: Arc<dyn NotificationHost>,
        policy: DispatchPolicy,
        seed_demo: bool,
    ) -> Self {
        Self {
            alerts: AlertList::open(store, seed_demo),
            gate: Arc::new(PermissionGate::new(host.clone())),
            notifier: Notifier::new(host, policy),
        }
    }

    /// Startup permission handshake.
    pub async fn initialize(&self) -> PermissionState {
        self.gate.initialize().await
    }

    pub fn gate(&self) -> Arc<PermissionGate> {
        self.gate.clone()
    }

    pub fn permission(&self) -> PermissionState {
        self.gate.state()
    }

    pub fn list(&self) -> &[Alert] {
        self.alerts.list()
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.alerts.get(id)
    }

    pub fn unread_count(&self) -> usize {
        self.alerts.unread_count()
    }

    pub fn mark_read(&mut self, id: &str) {
        self.alerts.mark_read(id);
    }

    pub fn dismiss(&mut self, id: &str) {
        self.alerts.dismiss(id);
    }

    /// Store a new alert and surface it. Returns `None` when the alert was rejected
    /// (duplicate or previously dismissed id) or already delivered.
    pub fn ingest(&mut self, alert: Alert) -> Option<Delivery> {
        let permission = self.gate.state();
        let stored = self.alerts.ingest(alert)?;
        self.notifier.deliver(stored, permission)
    }

    /// Ask for push permission; returns the outcome and, on grant, a notice to show.
    pub async fn request_permission(&self) -> (PermissionState, Option<Toast>) {
        let state = self.gate.request_permission().await;
        (state, permission_notice(state))
    }
}

/// Notice shown once push permission is granted.
pub fn permission_notice(state: PermissionState) -> Option<Toast> {
    (state == PermissionState::Granted).then(|| Toast {
        title: "Notifications Enabled".to_string(),
        description: "You'll now receive push notifications for disaster alerts.".to_string(),
        variant: ToastVariant::Standard,
    })
}
