//! Upline resolution with milestone compression.

use sqlx::SqliteConnection;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::db::Repository;
use crate::domain::MemberId;

/// One eligible ancestor and the commission level it earns at.
///
/// `level` counts eligible ancestors, not raw hops: capped ancestors are
/// skipped without advancing it, which is what compresses their would-be
/// share onto the next eligible ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upline {
    pub member_id: MemberId,
    pub level: i64,
}

#[derive(Debug, Error)]
pub enum UplineError {
    /// The referrer chain revisited a member. Malformed data; fail fast
    /// instead of walking forever.
    #[error("referral cycle detected at member {0}")]
    ReferralCycle(MemberId),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Walk the referral chain upward from `start`, collecting at most
/// `max_depth` eligible ancestors.
///
/// An ancestor is eligible iff it holds a package whose cap is unlimited or
/// strictly above the ancestor's lifetime earnings. Ineligible ancestors
/// (capped, or holding no package) are skipped for reward but the walk
/// continues through them.
///
/// Runs on the caller's connection so eligibility reads share the
/// transaction that will apply the credits. For a fixed tree state the
/// output is a pure function of `start`.
pub async fn resolve_uplines(
    repo: &Arc<Repository>,
    conn: &mut SqliteConnection,
    start: &MemberId,
    max_depth: usize,
) -> Result<Vec<Upline>, UplineError> {
    let mut result = Vec::new();
    if max_depth == 0 {
        return Ok(result);
    }

    let Some(start_member) = repo.get_member_tx(conn, start).await? else {
        return Ok(result);
    };

    let mut visited: HashSet<MemberId> = HashSet::new();
    visited.insert(start.clone());

    let mut cursor = start_member.referrer_id;
    let mut level: i64 = 1;

    while let Some(ancestor_id) = cursor {
        if !visited.insert(ancestor_id.clone()) {
            return Err(UplineError::ReferralCycle(ancestor_id));
        }

        let Some(ancestor) = repo.get_member_tx(conn, &ancestor_id).await? else {
            // Dangling referrer pointer: treat as the end of the chain.
            break;
        };

        let package = match &ancestor.package_id {
            Some(pid) => repo.get_package_tx(conn, pid).await?,
            None => None,
        };

        if ancestor.is_earning_eligible(package.as_ref()) {
            result.push(Upline {
                member_id: ancestor_id,
                level,
            });
            if result.len() >= max_depth {
                break;
            }
            level += 1;
        }

        cursor = ancestor.referrer_id;
    }

    Ok(result)
}
