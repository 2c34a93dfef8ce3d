//! Append-only ledger operations: transactions, activities, wallet balances.

use super::{activity_from_row, parse_decimal, transaction_from_row, Repository};
use crate::domain::{
    Activity, Decimal, EventKey, MemberId, NewTransaction, TimeMs, Transaction, WalletType,
};
use sqlx::{Row, SqliteConnection};

impl Repository {
    // =========================================================================
    // Transaction operations
    // =========================================================================

    /// Count ledger rows already recorded for an event key.
    ///
    /// The distributor uses this inside its transaction as the exactly-once
    /// guard; the unique index on (event_key, user_id, transaction_type,
    /// wallet_type) is the backstop. A package-holding house account may
    /// legitimately take two COMMISSION rows per event (COMPANY at level 0
    /// plus a BONUS upline credit), which is why wallet_type is part of the
    /// key.
    pub async fn count_event_transactions_tx(
        &self,
        conn: &mut SqliteConnection,
        event_key: &EventKey,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) as n FROM transactions WHERE event_key = ?")
            .bind(event_key.as_str())
            .fetch_one(conn)
            .await?;
        Ok(row.get("n"))
    }

    /// Insert one ledger row inside an open transaction. Returns the row id.
    pub async fn insert_transaction_tx(
        &self,
        conn: &mut SqliteConnection,
        tx: &NewTransaction,
        created_at: TimeMs,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions
            (event_key, user_id, from_user_id, package_id, amount,
             transaction_type, status, wallet_type, level, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.event_key.as_str())
        .bind(tx.user_id.as_str())
        .bind(tx.from_user_id.as_ref().map(|u| u.as_str()))
        .bind(tx.package_id.as_ref().map(|p| p.as_str()))
        .bind(tx.amount.to_canonical_string())
        .bind(tx.transaction_type.as_str())
        .bind(tx.status.as_str())
        .bind(tx.wallet_type.map(|w| w.as_str()))
        .bind(tx.level)
        .bind(created_at.as_i64())
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All ledger rows recorded for one triggering event, in insert order.
    pub async fn transactions_for_event(
        &self,
        event_key: &EventKey,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM transactions WHERE event_key = ? ORDER BY id ASC")
            .bind(event_key.as_str())
            .fetch_all(self.pool())
            .await?;
        Ok(rows.iter().map(transaction_from_row).collect())
    }

    /// A member's ledger history, newest first.
    pub async fn transactions_for_member(
        &self,
        member: &MemberId,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM transactions WHERE user_id = ? ORDER BY created_at_ms DESC, id DESC",
        )
        .bind(member.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(transaction_from_row).collect())
    }

    /// Signed sum of a member's COMPLETED rows for one wallet.
    ///
    /// # Implementation Note
    ///
    /// We iterate in Rust to preserve decimal precision. SQLite's SUM
    /// aggregate returns REAL (float), which would drift for money. Fetching
    /// rows and summing with our Decimal type keeps the arithmetic lossless.
    pub async fn wallet_balance(
        &self,
        member: &MemberId,
        wallet: WalletType,
    ) -> Result<Decimal, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT amount
            FROM transactions
            WHERE user_id = ? AND wallet_type = ? AND status = 'COMPLETED'
            ORDER BY id ASC
            "#,
        )
        .bind(member.as_str())
        .bind(wallet.as_str())
        .fetch_all(self.pool())
        .await?;

        let mut sum = Decimal::zero();
        for row in rows {
            let amount: String = row.get("amount");
            sum = sum + parse_decimal("amount", &amount);
        }

        Ok(sum)
    }

    // =========================================================================
    // Activity operations
    // =========================================================================

    /// Append an activity row inside an open transaction. Returns the row id.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_activity_tx(
        &self,
        conn: &mut SqliteConnection,
        activity_type: &str,
        title: &str,
        description: &str,
        user_id: &MemberId,
        transaction_id: Option<i64>,
        created_at: TimeMs,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO activities
            (activity_type, title, description, user_id, transaction_id, seen, created_at_ms)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(activity_type)
        .bind(title)
        .bind(description)
        .bind(user_id.as_str())
        .bind(transaction_id)
        .bind(created_at.as_i64())
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// A member's activity feed, newest first.
    pub async fn activities_for_member(
        &self,
        member: &MemberId,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM activities WHERE user_id = ? ORDER BY created_at_ms DESC, id DESC",
        )
        .bind(member.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(activity_from_row).collect())
    }

    /// Flip the seen flag. Returns false if no such activity exists.
    pub async fn mark_activity_seen(&self, activity_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE activities SET seen = 1 WHERE id = ?")
            .bind(activity_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
