//! Breadth-first, left-preferring placement into the binary tree.

use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::db::Repository;
use crate::domain::{Member, MemberId, Slot, TimeMs};

/// Where a newly registered member landed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub member_id: MemberId,
    /// None for a forest root.
    pub parent_id: Option<MemberId>,
    pub slot: Option<Slot>,
}

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("referrer {0} not found")]
    ReferrerNotFound(MemberId),
    #[error("referrer {0} is inactive")]
    ReferrerInactive(MemberId),
    #[error("member {0} is already registered")]
    MemberExists(MemberId),
    #[error("lost the slot race {0} times, giving up")]
    PlacementConflict(u32),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub struct PlacementEngine {
    repo: Arc<Repository>,
    config: Config,
}

impl PlacementEngine {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }

    /// Create the member row and assign its tree position atomically.
    ///
    /// With a referrer: BFS over the referrer's subtree for the first open
    /// slot (left preferred), then insert the member and claim the slot in
    /// one transaction. The claim is a compare-and-set; losing it to a
    /// concurrent registration rolls back and re-runs the BFS, bounded by
    /// `placement_max_retries`.
    ///
    /// Without a referrer: the member becomes a new forest root and no slot
    /// is consumed.
    pub async fn place(
        &self,
        member_id: MemberId,
        referrer_id: Option<MemberId>,
        now: TimeMs,
    ) -> Result<Placement, PlacementError> {
        if self.repo.get_member(&member_id).await?.is_some() {
            return Err(PlacementError::MemberExists(member_id));
        }

        let Some(referrer_id) = referrer_id else {
            let member = Member::new(member_id.clone(), None, now);
            let mut tx = self.repo.begin().await?;
            self.repo.insert_member_tx(&mut tx, &member).await?;
            tx.commit().await?;

            debug!(member = %member_id, "placed new forest root");
            return Ok(Placement {
                member_id,
                parent_id: None,
                slot: None,
            });
        };

        let referrer = self
            .repo
            .get_member(&referrer_id)
            .await?
            .ok_or_else(|| PlacementError::ReferrerNotFound(referrer_id.clone()))?;

        if !referrer.is_active && !self.config.allow_inactive_referrer {
            return Err(PlacementError::ReferrerInactive(referrer_id));
        }

        let attempts = self.config.placement_max_retries.max(1);
        for attempt in 1..=attempts {
            let (parent_id, slot) = self.find_open_slot(&referrer_id).await?;

            let member = Member::new(member_id.clone(), Some(referrer_id.clone()), now);
            let mut tx = self.repo.begin().await?;
            self.repo.insert_member_tx(&mut tx, &member).await?;
            let won = self
                .repo
                .claim_child_slot_tx(&mut tx, &parent_id, slot, &member_id)
                .await?;

            if won {
                tx.commit().await?;
                debug!(
                    member = %member_id,
                    parent = %parent_id,
                    slot = slot.as_str(),
                    attempt,
                    "placement committed"
                );
                return Ok(Placement {
                    member_id,
                    parent_id: Some(parent_id),
                    slot: Some(slot),
                });
            }

            // Racer took the slot between our BFS and the claim; the
            // rollback also discards the member insert.
            tx.rollback().await?;
            warn!(
                member = %member_id,
                parent = %parent_id,
                slot = slot.as_str(),
                attempt,
                "lost slot race, retrying placement"
            );
        }

        Err(PlacementError::PlacementConflict(attempts))
    }

    /// First node with an open child slot in left-to-right, top-to-bottom
    /// order over the subtree rooted at `root`. Keeps the tree filled
    /// breadth-first and balanced to within one level.
    async fn find_open_slot(&self, root: &MemberId) -> Result<(MemberId, Slot), PlacementError> {
        let mut queue: VecDeque<MemberId> = VecDeque::new();
        queue.push_back(root.clone());

        while let Some(node_id) = queue.pop_front() {
            let Some(node) = self.repo.get_member(&node_id).await? else {
                continue;
            };

            if node.left_child_id.is_none() {
                return Ok((node_id, Slot::Left));
            }
            if node.right_child_id.is_none() {
                return Ok((node_id, Slot::Right));
            }

            if let Some(left) = node.left_child_id {
                queue.push_back(left);
            }
            if let Some(right) = node.right_child_id {
                queue.push_back(right);
            }
        }

        // Unreachable for a well-formed tree: a finite binary tree always
        // has an open slot on its frontier.
        Err(PlacementError::ReferrerNotFound(root.clone()))
    }
}
