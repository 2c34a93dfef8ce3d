//! Ledger transaction records.

use serde::{Deserialize, Serialize};

use super::{
    Decimal, EventKey, MemberId, PackageId, TimeMs, TransactionStatus, TransactionType, WalletType,
};

/// One append-only ledger row.
///
/// Amounts are signed: credits positive, the purchaser's spend record
/// negative. A member's wallet balance is the signed sum of their COMPLETED
/// rows per wallet type. Immutable after creation except the status
/// transition PENDING -> COMPLETED | FAILED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub event_key: EventKey,
    pub user_id: MemberId,
    pub from_user_id: Option<MemberId>,
    pub package_id: Option<PackageId>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub wallet_type: Option<WalletType>,
    /// Commission level paid (0 = house), None for non-commission rows.
    pub level: Option<i64>,
    pub created_at_ms: TimeMs,
}

/// A transaction not yet assigned a row id, as produced by the distributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub event_key: EventKey,
    pub user_id: MemberId,
    pub from_user_id: Option<MemberId>,
    pub package_id: Option<PackageId>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub wallet_type: Option<WalletType>,
    pub level: Option<i64>,
}
