//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `members.rs` - Member tree, package catalog, and rate table operations
//! - `ledger.rs`  - Transaction and activity (append-only ledger) operations
//!
//! Methods suffixed `_tx` take a live `SqliteConnection` so the engines can
//! compose them inside a single transaction; the unsuffixed variants run
//! against the pool directly.

mod ledger;
mod members;

use crate::domain::{
    Activity, Decimal, EventKey, Member, MemberId, PackageId, TimeMs, Transaction,
    TransactionStatus, TransactionType, WalletType,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, Transaction as SqlxTransaction};
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a write transaction for an engine operation.
    pub async fn begin(&self) -> Result<SqlxTransaction<'_, sqlx::Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Liveness probe for the readiness endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Parse a stored canonical decimal, falling back to zero with a warning.
pub(crate) fn parse_decimal(column: &str, raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap_or_else(|e| {
        warn!(column, raw, error = %e, "Failed to parse stored decimal, using zero");
        Decimal::zero()
    })
}

pub(crate) fn member_from_row(row: &SqliteRow) -> Member {
    let total_earnings: String = row.get("total_earnings");
    Member {
        id: MemberId::new(row.get::<String, _>("id")),
        referrer_id: row
            .get::<Option<String>, _>("referrer_id")
            .map(MemberId::new),
        left_child_id: row
            .get::<Option<String>, _>("left_child_id")
            .map(MemberId::new),
        right_child_id: row
            .get::<Option<String>, _>("right_child_id")
            .map(MemberId::new),
        package_id: row
            .get::<Option<String>, _>("package_id")
            .map(PackageId::new),
        package_purchased_at_ms: row
            .get::<Option<i64>, _>("package_purchased_at_ms")
            .map(TimeMs::new),
        total_earnings: parse_decimal("total_earnings", &total_earnings),
        is_active: row.get::<i64, _>("is_active") != 0,
        created_at_ms: TimeMs::new(row.get("created_at_ms")),
    }
}

pub(crate) fn transaction_from_row(row: &SqliteRow) -> Transaction {
    let amount: String = row.get("amount");
    let tx_type: String = row.get("transaction_type");
    let status: String = row.get("status");
    let wallet: Option<String> = row.get("wallet_type");

    Transaction {
        id: row.get("id"),
        event_key: EventKey::new(row.get::<String, _>("event_key")),
        user_id: MemberId::new(row.get::<String, _>("user_id")),
        from_user_id: row
            .get::<Option<String>, _>("from_user_id")
            .map(MemberId::new),
        package_id: row
            .get::<Option<String>, _>("package_id")
            .map(PackageId::new),
        amount: parse_decimal("amount", &amount),
        transaction_type: TransactionType::parse(&tx_type).unwrap_or_else(|| {
            warn!(transaction_type = %tx_type, "Unknown transaction type, reading as COMMISSION");
            TransactionType::Commission
        }),
        status: TransactionStatus::parse(&status).unwrap_or_else(|| {
            warn!(status = %status, "Unknown transaction status, reading as FAILED");
            TransactionStatus::Failed
        }),
        wallet_type: wallet.as_deref().and_then(WalletType::parse),
        level: row.get("level"),
        created_at_ms: TimeMs::new(row.get("created_at_ms")),
    }
}

pub(crate) fn activity_from_row(row: &SqliteRow) -> Activity {
    Activity {
        id: row.get("id"),
        activity_type: row.get("activity_type"),
        title: row.get("title"),
        description: row.get("description"),
        user_id: MemberId::new(row.get::<String, _>("user_id")),
        transaction_id: row.get("transaction_id"),
        seen: row.get::<i64, _>("seen") != 0,
        created_at_ms: TimeMs::new(row.get("created_at_ms")),
    }
}
