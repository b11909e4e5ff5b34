// Notification dispatch - decides how a new alert is surfaced and delivers it once.
//
// `decide` is a pure function of (alert, permission, policy). `Notifier` executes
// decisions against the host and remembers which alert ids it already handled.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::model::{Alert, Severity};
use crate::core::notify::{DisplayOptions, NotificationHost, PermissionState, PushNotification};

/// Visual weight of an in-app notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Standard,
    Destructive,
}

/// In-app transient notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn for_alert(alert: &Alert) -> Self {
        Self {
            title: format!("{}: {}", alert.severity.label(), alert.title),
            description: format!("{} - {}", alert.location, alert.message),
            variant: if alert.severity.is_urgent() {
                ToastVariant::Destructive
            } else {
                ToastVariant::Standard
            },
        }
    }
}

/// Delivery policy knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// How long a non-critical push stays on screen
    pub auto_dismiss_after: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            auto_dismiss_after: Duration::from_secs(10),
        }
    }
}

/// What to do for one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub toast: Toast,
    pub push: Option<PushNotification>,
}

/// Build the OS push for an alert. Critical pushes stay until the user acts on them;
/// anything else closes after the policy delay.
pub fn push_for(alert: &Alert, policy: &DispatchPolicy) -> PushNotification {
    let critical = alert.severity == Severity::Critical;
    PushNotification {
        title: format!("Beacon Alert: {}", alert.title),
        body: format!("{} - {}", alert.location, alert.message),
        options: DisplayOptions {
            tag: alert.id.clone(),
            require_interaction: critical,
            auto_dismiss: if critical { None } else { Some(policy.auto_dismiss_after) },
            focus_on_click: true,
        },
    }
}

/// Decide how to surface a new alert.
///
/// Every alert gets a toast. Only critical alerts escalate to an OS push, and only
/// when permission is granted.
pub fn decide(alert: &Alert, permission: PermissionState, policy: &DispatchPolicy) -> Dispatch {
    let escalate = permission == PermissionState::Granted && alert.severity == Severity::Critical;
    Dispatch {
        toast: Toast::for_alert(alert),
        push: escalate.then(|| push_for(alert, policy)),
    }
}

/// Result of delivering one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub toast: Toast,
    /// The push handed to the host, if any
    pub push: Option<PushNotification>,
}

/// Executes dispatch decisions, at most once per alert id.
pub struct Notifier {
    host: Arc<dyn NotificationHost>,
    policy: DispatchPolicy,
    delivered: HashSet<String>,
}

impl Notifier {
    pub fn new(host: Arc<dyn NotificationHost>, policy: DispatchPolicy) -> Self {
        Self {
            host,
            policy,
            delivered: HashSet::new(),
        }
    }

    /// Surface an alert. Returns `None` if this id was already delivered.
    pub fn deliver(&mut self, alert: &Alert, permission: PermissionState) -> Option<Delivery> {
        if !self.delivered.insert(alert.id.clone()) {
            log::debug!("Alert {} already delivered, skipping", alert.id);
            return None;
        }

        let Dispatch { toast, push } = decide(alert, permission, &self.policy);
        let push = push.and_then(|push| match self.host.display(&push) {
            Ok(()) => {
                log::info!("Pushed {} alert {} ({})", alert.severity.label(), alert.id, alert.title);
                Some(push)
            }
            Err(e) => {
                log::error!("Failed to push alert {}: {}", alert.id, e);
                None
            }
        });

        Some(Delivery { toast, push })
    }
}
