//! Member records and the derived milestone/eligibility state.

use serde::{Deserialize, Serialize};

use super::{Decimal, MemberId, PackageId, TimeMs};
use crate::domain::Package;

/// A registered member and its position in the binary tree.
///
/// `referrer_id` is set once at registration and never changes. Child slots
/// are written at most once each, only by the placement engine; a filled slot
/// is never vacated. `total_earnings` is mutated only by the distributor and
/// never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub referrer_id: Option<MemberId>,
    pub left_child_id: Option<MemberId>,
    pub right_child_id: Option<MemberId>,
    pub package_id: Option<PackageId>,
    pub package_purchased_at_ms: Option<TimeMs>,
    pub total_earnings: Decimal,
    pub is_active: bool,
    pub created_at_ms: TimeMs,
}

impl Member {
    /// A brand-new member with no tree position or package yet.
    pub fn new(id: MemberId, referrer_id: Option<MemberId>, created_at_ms: TimeMs) -> Self {
        Member {
            id,
            referrer_id,
            left_child_id: None,
            right_child_id: None,
            package_id: None,
            package_purchased_at_ms: None,
            total_earnings: Decimal::zero(),
            is_active: true,
            created_at_ms,
        }
    }

    pub fn has_open_slot(&self) -> bool {
        self.left_child_id.is_none() || self.right_child_id.is_none()
    }

    /// Milestone state under the given package (the member's current one).
    ///
    /// Derived at read time, never stored. A member without a package is
    /// treated as capped: it cannot earn.
    pub fn milestone_state(&self, package: Option<&Package>) -> MilestoneState {
        match package {
            None => MilestoneState::Capped,
            Some(pkg) => match pkg.max_milestone {
                // Unlimited tier never caps.
                None => MilestoneState::Accumulating,
                Some(cap) => {
                    if self.total_earnings < cap {
                        MilestoneState::Accumulating
                    } else {
                        MilestoneState::Capped
                    }
                }
            },
        }
    }

    /// Whether this member can still receive commission credits.
    pub fn is_earning_eligible(&self, package: Option<&Package>) -> bool {
        self.milestone_state(package) == MilestoneState::Accumulating
    }
}

/// One-way earnings state per member+package pairing.
///
/// Moves back to `Accumulating` only when an upgrade raises the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneState {
    Accumulating,
    Capped,
}

impl MilestoneState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneState::Accumulating => "ACCUMULATING",
            MilestoneState::Capped => "CAPPED",
        }
    }
}
