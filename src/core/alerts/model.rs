// Alert model types shared by the store, feed, dispatcher and list controller.
//
// NOTE: the persisted field names (`type`, `timestamp`, `isRead`) are part of the
// on-disk record and must not change without a migration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Severity class of a disaster alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Immediate danger, evacuation-level
    Critical,
    /// Hazard likely in the affected area
    Warning,
    /// Advisory or preparedness notice
    Info,
}

impl Severity {
    /// Upper-case label used in notice titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }

    /// Only critical alerts render with elevated urgency
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::Critical)
    }

    /// Get all severity classes
    pub fn all() -> &'static [Severity] {
        &[Self::Critical, Self::Warning, Self::Info]
    }
}

/// A single disaster notification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub location: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "isRead")]
    pub is_read: bool,
}

impl Alert {
    /// Create a new unread alert stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            title: title.into(),
            message: message.into(),
            location: location.into(),
            created_at: Utc::now(),
            is_read: false,
        }
    }

    /// A record without an identity cannot be addressed by mark-read or dismiss.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Fixed demo set shown on first run so the feed is never empty.
pub fn demo_alerts() -> Vec<Alert> {
    let now = Utc::now();
    vec![
        Alert {
            id: "1".to_string(),
            severity: Severity::Critical,
            title: "Cyclone Alert".to_string(),
            message: "Severe cyclonic storm approaching coastal areas. Immediate evacuation recommended for low-lying areas.".to_string(),
            location: "Odisha Coast".to_string(),
            created_at: now - Duration::minutes(30),
            is_read: false,
        },
        Alert {
            id: "2".to_string(),
            severity: Severity::Warning,
            title: "Heavy Rainfall Warning".to_string(),
            message: "Heavy to very heavy rainfall expected in the next 24 hours. Risk of flash floods in urban areas.".to_string(),
            location: "Mumbai, Maharashtra".to_string(),
            created_at: now - Duration::hours(2),
            is_read: false,
        },
        Alert {
            id: "3".to_string(),
            severity: Severity::Info,
            title: "Earthquake Preparedness Drill".to_string(),
            message: "Scheduled earthquake preparedness drill tomorrow at 10 AM. All residents are advised to participate.".to_string(),
            location: "Delhi NCR".to_string(),
            created_at: now - Duration::hours(6),
            is_read: true,
        },
    ]
}
