//! Registration and upgrade orchestration.
//!
//! The HTTP edge confirms a payment, then calls in here; this module
//! composes the placement engine and the distributor into one
//! success-or-failure result per triggering event.

use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::db::Repository;
use crate::domain::{Decimal, EventKey, EventKind, MemberId, PackageId, TimeMs, Transaction};
use crate::engine::distributor::{DistributionError, Distributor, TriggerEvent};
use crate::engine::placement::{Placement, PlacementEngine, PlacementError};

/// A registration request as handed in by the payment-confirmation side.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Caller-supplied id, or generated when absent.
    pub member_id: Option<MemberId>,
    pub referrer_id: Option<MemberId>,
    /// Package purchase confirmed alongside the registration; a bare
    /// registration (root/admin bootstrap) carries none.
    pub purchase: Option<PurchaseRequest>,
}

#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub package_id: PackageId,
    pub amount: Decimal,
    pub event_key: EventKey,
}

/// Everything a registration produced: the tree position and the ledger rows.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub placement: Placement,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("member {0} not found")]
    MemberNotFound(MemberId),
    #[error("package {0} not found")]
    PackageNotFound(PackageId),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct Enrollment {
    repo: Arc<Repository>,
    placement: Arc<PlacementEngine>,
    distributor: Arc<Distributor>,
}

impl Enrollment {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let placement = Arc::new(PlacementEngine::new(repo.clone(), config.clone()));
        let distributor = Arc::new(Distributor::new(repo.clone(), config));
        Self {
            repo,
            placement,
            distributor,
        }
    }

    /// Place a new member, then distribute commissions for the confirmed
    /// purchase, if any.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, EnrollmentError> {
        // Validate the package before touching the tree, so a bad catalog id
        // cannot leave a placed member without its purchase.
        if let Some(purchase) = &request.purchase {
            if self.repo.get_package(&purchase.package_id).await?.is_none() {
                return Err(EnrollmentError::PackageNotFound(purchase.package_id.clone()));
            }
        }

        let member_id = request.member_id.unwrap_or_else(MemberId::generate);
        let placement = self
            .placement
            .place(member_id.clone(), request.referrer_id, TimeMs::now())
            .await?;

        let transactions = match request.purchase {
            Some(purchase) => {
                self.distributor
                    .distribute(&TriggerEvent {
                        event_key: purchase.event_key,
                        kind: EventKind::Registration,
                        member_id,
                        package_id: purchase.package_id,
                        amount: purchase.amount,
                    })
                    .await?
            }
            None => Vec::new(),
        };

        Ok(RegistrationOutcome {
            placement,
            transactions,
        })
    }

    /// Distribute commissions for a confirmed package upgrade.
    pub async fn upgrade(
        &self,
        member_id: MemberId,
        purchase: PurchaseRequest,
    ) -> Result<Vec<Transaction>, EnrollmentError> {
        if self.repo.get_member(&member_id).await?.is_none() {
            return Err(EnrollmentError::MemberNotFound(member_id));
        }
        if self.repo.get_package(&purchase.package_id).await?.is_none() {
            return Err(EnrollmentError::PackageNotFound(purchase.package_id));
        }

        let transactions = self
            .distributor
            .distribute(&TriggerEvent {
                event_key: purchase.event_key,
                kind: EventKind::Upgrade,
                member_id,
                package_id: purchase.package_id,
                amount: purchase.amount,
            })
            .await?;

        Ok(transactions)
    }
}
