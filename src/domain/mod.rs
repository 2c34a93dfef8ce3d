//! Domain types for the referral placement and commission engine.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - Domain primitives: MemberId, PackageId, EventKey, TimeMs, ledger enums
//! - Member, Package, CommissionRate, Transaction and Activity records
//! - The derived milestone/eligibility state

pub mod activity;
pub mod decimal;
pub mod member;
pub mod package;
pub mod primitives;
pub mod rate;
pub mod transaction;

pub use activity::{Activity, ACTIVITY_COMMISSION, ACTIVITY_REGISTRATION, ACTIVITY_UPGRADE};
pub use decimal::Decimal;
pub use member::{Member, MilestoneState};
pub use package::Package;
pub use primitives::{
    EventKey, EventKind, MemberId, PackageId, Slot, TimeMs, TransactionStatus, TransactionType,
    WalletType,
};
pub use rate::{CommissionRate, RateTable, HOUSE_LEVEL};
pub use transaction::{NewTransaction, Transaction};
