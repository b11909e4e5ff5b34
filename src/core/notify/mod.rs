// OS-level notification surface.
//
// Architecture:
// - mod.rs: Permission state, push payload and the host capability trait
// - gate.rs: Permission handshake (query, one-shot request, auto-request on start)
// - desktop.rs: Host implementation backed by the desktop notification service

pub mod desktop;
pub mod gate;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::HostError;

/// User consent for OS-level push notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Never asked, or the prompt was closed without an answer
    #[default]
    Unasked,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unasked)
    }
}

/// Display options for a push notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Coalescing key; displays sharing a tag replace each other
    pub tag: String,
    /// Stay on screen until the user interacts with it
    pub require_interaction: bool,
    /// Close automatically after this delay
    pub auto_dismiss: Option<Duration>,
    /// Bring the application forward when clicked
    pub focus_on_click: bool,
}

/// A push notification ready for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    pub options: DisplayOptions,
}

/// Host notification capability.
///
/// Only the host mutates the permission state; the application can ask for a
/// prompt while the state is `Unasked`.
#[async_trait]
pub trait NotificationHost: Send + Sync {
    /// Current permission as reported by the host
    fn permission(&self) -> PermissionState;

    /// Prompt the user and wait for the answer
    async fn request_permission(&self) -> Result<PermissionState, HostError>;

    /// Show a push notification
    fn display(&self, push: &PushNotification) -> Result<(), HostError>;
}
