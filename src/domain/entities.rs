//! Domain entity records shared across layers.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::Authority;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub version: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub enabled: bool,
    pub locked: bool,
    pub authorities: Vec<Authority>,
}

impl UserRecord {
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }

    /// Enabled and not locked.
    pub fn is_account_usable(&self) -> bool {
        self.enabled && !self.locked
    }
}
