use thiserror::Error;

/// Failure writing or reading the persisted alert record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("alert store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("alert store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by the host notification surface.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("notification service unavailable: {0}")]
    Unavailable(String),
    #[error("failed to display notification: {0}")]
    Display(String),
    #[error("permission prompt failed: {0}")]
    Prompt(String),
}
