// Plain-text rendering of the alert feed for the terminal front end.

use std::fmt::Write;

use chrono::Local;

use super::advisory::Advisory;
use super::alerts::dispatch::{Toast, ToastVariant};
use super::alerts::model::Alert;

/// Render the alert feed. Nothing is rendered for a signed-out user.
pub fn render_alerts(alerts: &[Alert], authenticated: bool) -> Option<String> {
    if !authenticated {
        return None;
    }

    let unread = alerts.iter().filter(|a| !a.is_read).count();
    let mut out = String::from("Disaster Alerts");
    if unread > 0 {
        let _ = write!(out, " ({} new)", unread);
    }
    out.push('\n');

    if alerts.is_empty() {
        out.push_str("  No active disaster alerts\n  Stay prepared and stay safe!\n");
        return Some(out);
    }

    for alert in alerts {
        let marker = if alert.is_read { ' ' } else { '*' };
        let _ = writeln!(
            out,
            "{} [{}] {} - {}\n    {}\n    {} | {} | id {}",
            marker,
            alert.severity.label(),
            alert.title,
            alert.location,
            alert.message,
            alert.location,
            alert.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            alert.id,
        );
    }
    Some(out)
}

pub fn render_toast(toast: &Toast) -> String {
    match toast.variant {
        ToastVariant::Destructive => format!("!! {}\n   {}", toast.title, toast.description),
        ToastVariant::Standard => format!("-- {}\n   {}", toast.title, toast.description),
    }
}

pub fn render_advisories(advisories: &[Advisory]) -> String {
    let mut out = String::new();
    for advisory in advisories {
        let _ = writeln!(
            out,
            "[{}] {}\n    {}\n    {} | {}",
            advisory.severity.label(),
            advisory.title,
            advisory.description,
            advisory.location,
            advisory.source,
        );
    }
    out
}
