// Permission gate - mediates the host's notification consent handshake.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use super::{NotificationHost, PermissionState};

pub struct PermissionGate {
    host: Arc<dyn NotificationHost>,
    state: watch::Sender<PermissionState>,
    /// Serializes prompts so at most one is shown at a time
    prompt: Mutex<()>,
    /// The startup auto-request happens at most once per gate
    auto_requested: AtomicBool,
}

impl PermissionGate {
    pub fn new(host: Arc<dyn NotificationHost>) -> Self {
        let (state, _) = watch::channel(PermissionState::Unasked);
        Self {
            host,
            state,
            prompt: Mutex::new(()),
            auto_requested: AtomicBool::new(false),
        }
    }

    /// Current permission as last observed.
    pub fn state(&self) -> PermissionState {
        *self.state.borrow()
    }

    /// Watch permission changes.
    pub fn subscribe(&self) -> watch::Receiver<PermissionState> {
        self.state.subscribe()
    }

    /// Adopt the host's answer if it has one.
    fn refresh(&self) -> PermissionState {
        let host_state = self.host.permission();
        if host_state.is_resolved() {
            self.state.send_replace(host_state);
        }
        self.state()
    }

    /// Startup handshake: adopt what the host reports, and if the user was never
    /// asked, prompt once.
    pub async fn initialize(&self) -> PermissionState {
        let current = self.refresh();
        if current == PermissionState::Unasked && !self.auto_requested.swap(true, Ordering::SeqCst) {
            log::info!("Notification permission not yet requested, asking once");
            return self.request_permission().await;
        }
        current
    }

    /// Ask the host for permission and wait for the answer.
    ///
    /// Returns immediately without prompting when the state is already resolved.
    /// A failed prompt resolves to `Denied`.
    pub async fn request_permission(&self) -> PermissionState {
        let current = self.refresh();
        if current.is_resolved() {
            return current;
        }

        let _guard = self.prompt.lock().await;
        // Resolved by a concurrent caller while we waited for the lock
        let current = self.refresh();
        if current.is_resolved() {
            return current;
        }

        let resolved = match self.host.request_permission().await {
            Ok(state) => state,
            Err(e) => {
                log::error!("Notification permission request failed: {}", e);
                PermissionState::Denied
            }
        };
        self.state.send_replace(resolved);
        log::info!("Notification permission is now {:?}", resolved);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notify::testing::{PromptAnswer, RecordingHost};

    fn gate_for(host: &Arc<RecordingHost>) -> PermissionGate {
        PermissionGate::new(host.clone())
    }

    #[tokio::test]
    async fn test_request_is_idempotent_once_granted() {
        let host = Arc::new(RecordingHost::new(
            PermissionState::Unasked,
            PromptAnswer::Answer(PermissionState::Granted),
        ));
        let gate = gate_for(&host);

        assert_eq!(gate.request_permission().await, PermissionState::Granted);
        assert_eq!(gate.request_permission().await, PermissionState::Granted);
        assert_eq!(host.prompts(), 1);
    }

    #[tokio::test]
    async fn test_resolved_host_is_never_prompted() {
        for state in [PermissionState::Granted, PermissionState::Denied] {
            let host = Arc::new(RecordingHost::with_permission(state));
            let gate = gate_for(&host);

            assert_eq!(gate.initialize().await, state);
            assert_eq!(gate.request_permission().await, state);
            assert_eq!(host.prompts(), 0);
        }
    }

    #[tokio::test]
    async fn test_initialize_auto_requests_once() {
        // Closing the prompt leaves the state unasked
        let host = Arc::new(RecordingHost::new(
            PermissionState::Unasked,
            PromptAnswer::Answer(PermissionState::Unasked),
        ));
        let gate = gate_for(&host);

        assert_eq!(gate.initialize().await, PermissionState::Unasked);
        assert_eq!(gate.initialize().await, PermissionState::Unasked);
        assert_eq!(host.prompts(), 1);

        // An explicit request may still prompt again
        gate.request_permission().await;
        assert_eq!(host.prompts(), 2);
    }

    #[tokio::test]
    async fn test_prompt_failure_resolves_to_denied() {
        let host = Arc::new(RecordingHost::new(PermissionState::Unasked, PromptAnswer::Fail));
        let gate = gate_for(&host);

        assert_eq!(gate.request_permission().await, PermissionState::Denied);
        assert_eq!(gate.state(), PermissionState::Denied);
        // Denied is terminal for this gate
        assert_eq!(gate.request_permission().await, PermissionState::Denied);
        assert_eq!(host.prompts(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_prompt_once() {
        let host = Arc::new(RecordingHost::new(
            PermissionState::Unasked,
            PromptAnswer::Answer(PermissionState::Granted),
        ));
        let gate = Arc::new(gate_for(&host));

        let (a, b) = tokio::join!(gate.request_permission(), gate.request_permission());
        assert_eq!(a, PermissionState::Granted);
        assert_eq!(b, PermissionState::Granted);
        assert_eq!(host.prompts(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_resolution() {
        let host = Arc::new(RecordingHost::new(
            PermissionState::Unasked,
            PromptAnswer::Answer(PermissionState::Granted),
        ));
        let gate = gate_for(&host);
        let mut rx = gate.subscribe();

        gate.request_permission().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), PermissionState::Granted);
    }
}
