//! Desktop notification host.
//!
//! On freedesktop systems pushes go through the notification service via
//! `notify-rust`: the consent prompt is an actionable notification, tags map to
//! notification ids so a repeated tag replaces the earlier bubble, and clicks are
//! forwarded on the activation channel. Other platforms only log.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{NotificationHost, PermissionState, PushNotification};
use crate::core::error::HostError;

const APP_NAME: &str = "Beacon";

/// Host notification id per tag, for bubbles still on screen
#[derive(Default)]
struct ShownTags(Mutex<HashMap<String, u32>>);

impl ShownTags {
    #[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
    fn id_for(&self, tag: &str) -> Option<u32> {
        lock(&self.0).get(tag).copied()
    }

    /// Returns true when the tag was not on screen yet and so has no click
    /// listener. A replaced bubble keeps its id and its listener.
    fn record(&self, tag: &str, id: u32) -> bool {
        lock(&self.0).insert(tag.to_string(), id).is_none()
    }

    #[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
    fn closed(&self, tag: &str) {
        lock(&self.0).remove(tag);
    }
}

pub struct DesktopHost {
    permission: Mutex<PermissionState>,
    shown: Arc<ShownTags>,
    /// Tags of notifications the user clicked
    #[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
    activations: mpsc::UnboundedSender<String>,
}

impl DesktopHost {
    /// `permission` is the answer remembered from an earlier session.
    pub fn new(permission: PermissionState, activations: mpsc::UnboundedSender<String>) -> Self {
        Self {
            permission: Mutex::new(permission),
            shown: Arc::new(ShownTags::default()),
            activations,
        }
    }

    fn set_permission(&self, state: PermissionState) {
        *lock(&self.permission) = state;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(all(unix, not(target_os = "macos")))]
#[async_trait]
impl NotificationHost for DesktopHost {
    fn permission(&self) -> PermissionState {
        *lock(&self.permission)
    }

    async fn request_permission(&self) -> Result<PermissionState, HostError> {
        use notify_rust::{Notification, Timeout};

        let handle = Notification::new()
            .appname(APP_NAME)
            .summary("Enable Beacon alerts?")
            .body("Allow push notifications for critical disaster alerts.")
            .action("allow", "Allow")
            .action("deny", "Don't allow")
            .timeout(Timeout::Never)
            .show()
            .map_err(|e| HostError::Unavailable(e.to_string()))?;

        let answer = tokio::task::spawn_blocking(move || {
            let mut answer = PermissionState::Unasked;
            handle.wait_for_action(|action| {
                answer = match action {
                    "allow" => PermissionState::Granted,
                    "deny" => PermissionState::Denied,
                    // "__closed" or anything else: no answer
                    _ => PermissionState::Unasked,
                };
            });
            answer
        })
        .await
        .map_err(|e| HostError::Prompt(e.to_string()))?;

        self.set_permission(answer);
        Ok(answer)
    }

    fn display(&self, push: &PushNotification) -> Result<(), HostError> {
        use notify_rust::{Notification, Timeout, Urgency};

        let options = &push.options;
        let mut notification = Notification::new();
        notification.appname(APP_NAME).summary(&push.title).body(&push.body);

        if options.require_interaction {
            notification.urgency(Urgency::Critical).timeout(Timeout::Never);
        } else if let Some(delay) = options.auto_dismiss {
            let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
            notification.urgency(Urgency::Normal).timeout(Timeout::Milliseconds(millis));
        }
        if options.focus_on_click {
            notification.action("default", "Open");
        }
        if let Some(id) = self.shown.id_for(&options.tag) {
            notification.id(id);
        }

        let handle = notification
            .show()
            .map_err(|e| HostError::Display(e.to_string()))?;
        let first_showing = self.shown.record(&options.tag, handle.id());

        // One listener per bubble; it ends when the bubble is clicked, closed or expires
        if first_showing {
            let tag = options.tag.clone();
            let shown = Arc::clone(&self.shown);
            let activations = self.activations.clone();
            let focus_on_click = options.focus_on_click;
            std::thread::spawn(move || {
                handle.wait_for_action(|action| {
                    if focus_on_click && action == "default" {
                        let _ = activations.send(tag.clone());
                    }
                });
                shown.closed(&tag);
            });
        }

        Ok(())
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
#[async_trait]
impl NotificationHost for DesktopHost {
    fn permission(&self) -> PermissionState {
        *lock(&self.permission)
    }

    async fn request_permission(&self) -> Result<PermissionState, HostError> {
        // Consent is managed in the OS settings on these platforms
        log::info!("No in-app consent prompt on this platform, treating notifications as allowed");
        self.set_permission(PermissionState::Granted);
        Ok(PermissionState::Granted)
    }

    fn display(&self, push: &PushNotification) -> Result<(), HostError> {
        if !self.shown.record(&push.options.tag, 0) {
            return Ok(());
        }
        log::warn!("{} - {}", push.title, push.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remembered_permission_is_reported() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let host = DesktopHost::new(PermissionState::Denied, tx);
        assert_eq!(host.permission(), PermissionState::Denied);

        host.set_permission(PermissionState::Granted);
        assert_eq!(host.permission(), PermissionState::Granted);
    }

    #[test]
    fn test_shown_tags_forget_closed_bubbles() {
        let shown = ShownTags::default();
        assert!(shown.record("a1", 7));
        // Replacing keeps the existing listener
        assert!(!shown.record("a1", 7));
        assert_eq!(shown.id_for("a1"), Some(7));

        shown.closed("a1");
        assert_eq!(shown.id_for("a1"), None);
        assert!(lock(&shown.0).is_empty());
        assert!(shown.record("a1", 9));
    }
}
