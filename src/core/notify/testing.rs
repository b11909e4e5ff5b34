// In-memory notification host for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{NotificationHost, PermissionState, PushNotification};
use crate::core::error::HostError;

/// What the simulated user answers when prompted
#[derive(Debug, Clone, Copy)]
pub enum PromptAnswer {
    Answer(PermissionState),
    Fail,
}

pub struct RecordingHost {
    permission: Mutex<PermissionState>,
    answer: PromptAnswer,
    prompts: AtomicUsize,
    displayed: Mutex<Vec<PushNotification>>,
}

impl RecordingHost {
    pub fn new(permission: PermissionState, answer: PromptAnswer) -> Self {
        Self {
            permission: Mutex::new(permission),
            answer,
            prompts: AtomicUsize::new(0),
            displayed: Mutex::new(Vec::new()),
        }
    }

    /// Host whose permission is already resolved
    pub fn with_permission(permission: PermissionState) -> Self {
        Self::new(permission, PromptAnswer::Answer(permission))
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn displayed(&self) -> Vec<PushNotification> {
        self.displayed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationHost for RecordingHost {
    fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> Result<PermissionState, HostError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match self.answer {
            PromptAnswer::Answer(state) => {
                *self.permission.lock().unwrap() = state;
                Ok(state)
            }
            PromptAnswer::Fail => Err(HostError::Prompt("prompt blocked".to_string())),
        }
    }

    fn display(&self, push: &PushNotification) -> Result<(), HostError> {
        self.displayed.lock().unwrap().push(push.clone());
        Ok(())
    }
}
