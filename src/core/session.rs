//! Signed-in user record.
//!
//! Sign-in itself lives elsewhere; this only reads the record it leaves behind so
//! the alert view can tell whether someone is authenticated.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

const USER_RECORD: &str = "beacon_user.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

/// The user currently signed in, if any.
///
/// A record that cannot be parsed is removed, which signs the user out.
pub fn signed_in_user(data_dir: &Path) -> Option<User> {
    let path = data_dir.join(USER_RECORD);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(user) => Some(user),
        Err(e) => {
            log::warn!("Discarding unreadable user record {:?}: {}", path, e);
            if let Err(e) = fs::remove_file(&path) {
                log::error!("Failed to remove {:?}: {}", path, e);
            }
            None
        }
    }
}
