//! Activity notification records.

use serde::{Deserialize, Serialize};

use super::{MemberId, TimeMs};

/// A notification appended as a side effect of commission distribution.
///
/// Never mutated except the `seen` flag, flipped by the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub activity_type: String,
    pub title: String,
    pub description: String,
    pub user_id: MemberId,
    pub transaction_id: Option<i64>,
    pub seen: bool,
    pub created_at_ms: TimeMs,
}

pub const ACTIVITY_COMMISSION: &str = "commission";
pub const ACTIVITY_REGISTRATION: &str = "registration";
pub const ACTIVITY_UPGRADE: &str = "upgrade";
