//! Authenticated caller identity.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// The caller an accepted bearer token describes.
///
/// Reconstructed from the token on every request and never stored server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: i64,
    pub display_name: String,
    pub roles: BTreeSet<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
