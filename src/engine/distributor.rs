//! Commission computation and atomic distribution.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::Repository;
use crate::domain::{
    Decimal, EventKey, EventKind, MemberId, NewTransaction, PackageId, RateTable, TimeMs,
    Transaction, TransactionStatus, TransactionType, WalletType, ACTIVITY_COMMISSION,
    ACTIVITY_REGISTRATION, ACTIVITY_UPGRADE, HOUSE_LEVEL,
};
use crate::engine::upline::{resolve_uplines, Upline, UplineError};

/// A confirmed qualifying event, handed in by the payment side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub event_key: EventKey,
    pub kind: EventKind,
    pub member_id: MemberId,
    pub package_id: PackageId,
    pub amount: Decimal,
}

/// One computed wallet credit, before it hits the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub member_id: MemberId,
    pub wallet: WalletType,
    pub level: i64,
    pub amount: Decimal,
}

#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("recipient {0} not found")]
    RecipientNotFound(MemberId),
    #[error("package {0} not found")]
    PackageNotFound(PackageId),
    #[error("amount {0} is outside the ledger bounds")]
    LedgerOverflow(Decimal),
    #[error(transparent)]
    Upline(#[from] UplineError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Compute the house and upline credits for a triggering amount.
///
/// Pure: the split depends only on the inputs. Missing rate for a level pays
/// nothing for that level; zero credits after ledger rounding are dropped.
/// Each share is clamped to the budget left of the triggering amount, so
/// per-credit half-up rounding on tiny amounts can never pay out more than
/// came in.
pub fn compute_credits(
    amount: Decimal,
    rates: &RateTable,
    uplines: &[Upline],
    house: &MemberId,
) -> Vec<Credit> {
    let mut credits = Vec::with_capacity(uplines.len() + 1);
    let mut remaining = amount.round_ledger();

    if let Some(rate) = rates.house_rate() {
        let mut share = (amount * rate).round_ledger();
        if share > remaining {
            share = remaining;
        }
        if share.is_positive() {
            remaining = remaining - share;
            credits.push(Credit {
                member_id: house.clone(),
                wallet: WalletType::Company,
                level: HOUSE_LEVEL,
                amount: share,
            });
        }
    }

    for upline in uplines {
        let Some(rate) = rates.rate_for(upline.level) else {
            debug!(level = upline.level, "no rate configured, level pays nothing");
            continue;
        };
        let mut share = (amount * rate).round_ledger();
        if share > remaining {
            share = remaining;
        }
        if !share.is_positive() {
            continue;
        }
        remaining = remaining - share;
        credits.push(Credit {
            member_id: upline.member_id.clone(),
            wallet: WalletType::Bonus,
            level: upline.level,
            amount: share,
        });
    }

    credits
}

pub struct Distributor {
    repo: Arc<Repository>,
    config: Config,
}

impl Distributor {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }

    /// Apply a qualifying event to the ledger as one all-or-nothing unit.
    ///
    /// In a single transaction: the duplicate-event guard, the purchaser's
    /// spend record and package assignment, the house credit, one BONUS
    /// credit per eligible upline, the `total_earnings` bumps, and one
    /// activity per credit. Replaying an event key is a success-no-op that
    /// returns the previously recorded rows.
    pub async fn distribute(
        &self,
        event: &TriggerEvent,
    ) -> Result<Vec<Transaction>, DistributionError> {
        if !event.amount.is_positive() || event.amount > self.config.max_ledger_amount {
            return Err(DistributionError::LedgerOverflow(event.amount));
        }

        let now = TimeMs::now();
        let mut tx = self.repo.begin().await?;

        if self
            .repo
            .count_event_transactions_tx(&mut tx, &event.event_key)
            .await?
            > 0
        {
            drop(tx);
            warn!(event_key = %event.event_key, "duplicate event replayed, returning recorded rows");
            return Ok(self.repo.transactions_for_event(&event.event_key).await?);
        }

        let purchaser = self
            .repo
            .get_member_tx(&mut tx, &event.member_id)
            .await?
            .ok_or_else(|| DistributionError::RecipientNotFound(event.member_id.clone()))?;

        let package = self
            .repo
            .get_package_tx(&mut tx, &event.package_id)
            .await?
            .ok_or_else(|| DistributionError::PackageNotFound(event.package_id.clone()))?;

        let mut recorded: Vec<Transaction> = Vec::new();

        // The purchase itself: a spend record against the REGISTER wallet,
        // not a commission.
        let spend = NewTransaction {
            event_key: event.event_key.clone(),
            user_id: purchaser.id.clone(),
            from_user_id: None,
            package_id: Some(package.id.clone()),
            amount: -event.amount.round_ledger(),
            transaction_type: event.kind.spend_transaction_type(),
            status: TransactionStatus::Completed,
            wallet_type: Some(WalletType::Register),
            level: None,
        };
        // Two confirmations of the same event can both pass the count guard;
        // the loser fails on this first write. If rows for the key exist by
        // then, the winner committed and this is the replay path, not an
        // error.
        let spend_id = match self.repo.insert_transaction_tx(&mut tx, &spend, now).await {
            Ok(id) => id,
            Err(sqlx::Error::Database(db_err)) => {
                drop(tx);
                let committed = self.repo.transactions_for_event(&event.event_key).await?;
                if committed.is_empty() {
                    return Err(sqlx::Error::Database(db_err).into());
                }
                warn!(
                    event_key = %event.event_key,
                    "lost race to a concurrent duplicate event, returning recorded rows"
                );
                return Ok(committed);
            }
            Err(e) => return Err(e.into()),
        };
        recorded.push(materialize(spend_id, &spend, now));

        let (activity_type, title) = match event.kind {
            EventKind::Registration => (ACTIVITY_REGISTRATION, "Package purchased"),
            EventKind::Upgrade => (ACTIVITY_UPGRADE, "Package upgraded"),
        };
        self.repo
            .insert_activity_tx(
                &mut tx,
                activity_type,
                title,
                &format!("{} package {} for {}", title, package.name, event.amount),
                &purchaser.id,
                Some(spend_id),
                now,
            )
            .await?;

        self.repo
            .set_member_package_tx(&mut tx, &purchaser.id, &package.id, now)
            .await?;

        // Eligibility reads and the credits below share this transaction,
        // so a racing distribution cannot push a member past its cap.
        let rates = self.repo.load_rates_tx(&mut tx).await?;
        let uplines = resolve_uplines(
            &self.repo,
            &mut tx,
            &event.member_id,
            self.config.max_upline_depth,
        )
        .await?;
        let credits = compute_credits(
            event.amount,
            &rates,
            &uplines,
            &self.config.admin_member_id,
        );

        for credit in &credits {
            let row = NewTransaction {
                event_key: event.event_key.clone(),
                user_id: credit.member_id.clone(),
                from_user_id: Some(event.member_id.clone()),
                package_id: Some(package.id.clone()),
                amount: credit.amount,
                transaction_type: TransactionType::Commission,
                status: TransactionStatus::Completed,
                wallet_type: Some(credit.wallet),
                level: Some(credit.level),
            };
            let row_id = self.repo.insert_transaction_tx(&mut tx, &row, now).await?;
            recorded.push(materialize(row_id, &row, now));

            if credit.wallet == WalletType::Bonus {
                let found = self
                    .repo
                    .add_earnings_tx(&mut tx, &credit.member_id, credit.amount)
                    .await?;
                if !found {
                    return Err(DistributionError::RecipientNotFound(
                        credit.member_id.clone(),
                    ));
                }
            } else if self
                .repo
                .get_member_tx(&mut tx, &credit.member_id)
                .await?
                .is_none()
            {
                // House account must exist; a missing wallet is a fatal
                // integrity failure, never a silent skip.
                return Err(DistributionError::RecipientNotFound(
                    credit.member_id.clone(),
                ));
            }

            self.repo
                .insert_activity_tx(
                    &mut tx,
                    ACTIVITY_COMMISSION,
                    "Commission received",
                    &format!(
                        "Level {} commission of {} from {}",
                        credit.level, credit.amount, event.member_id
                    ),
                    &credit.member_id,
                    Some(row_id),
                    now,
                )
                .await?;
        }

        tx.commit().await?;

        info!(
            event_key = %event.event_key,
            member = %event.member_id,
            amount = %event.amount,
            credits = credits.len(),
            "distribution committed"
        );
        Ok(recorded)
    }
}

fn materialize(id: i64, row: &NewTransaction, created_at: TimeMs) -> Transaction {
    Transaction {
        id,
        event_key: row.event_key.clone(),
        user_id: row.user_id.clone(),
        from_user_id: row.from_user_id.clone(),
        package_id: row.package_id.clone(),
        amount: row.amount,
        transaction_type: row.transaction_type,
        status: row.status,
        wallet_type: row.wallet_type,
        level: row.level,
        created_at_ms: created_at,
    }
}
