//! Member tree, package catalog, and rate table operations.

use super::{member_from_row, parse_decimal, Repository};
use crate::domain::{
    CommissionRate, Decimal, Member, MemberId, Package, PackageId, RateTable, Slot, TimeMs,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

fn package_from_row(row: &SqliteRow) -> Package {
    let price: String = row.get("price");
    let point_value: String = row.get("point_value");
    let max_milestone: Option<String> = row.get("max_milestone");

    Package {
        id: PackageId::new(row.get::<String, _>("id")),
        name: row.get("name"),
        price: parse_decimal("price", &price),
        point_value: parse_decimal("point_value", &point_value),
        max_milestone: max_milestone.map(|m| parse_decimal("max_milestone", &m)),
        active_days: row.get("active_days"),
    }
}

impl Repository {
    // =========================================================================
    // Member operations
    // =========================================================================

    /// Insert a member row inside an open transaction.
    pub async fn insert_member_tx(
        &self,
        conn: &mut SqliteConnection,
        member: &Member,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO members
            (id, referrer_id, left_child_id, right_child_id, package_id,
             package_purchased_at_ms, total_earnings, is_active, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(member.id.as_str())
        .bind(member.referrer_id.as_ref().map(|r| r.as_str()))
        .bind(member.left_child_id.as_ref().map(|c| c.as_str()))
        .bind(member.right_child_id.as_ref().map(|c| c.as_str()))
        .bind(member.package_id.as_ref().map(|p| p.as_str()))
        .bind(member.package_purchased_at_ms.map(|t| t.as_i64()))
        .bind(member.total_earnings.to_canonical_string())
        .bind(member.is_active as i64)
        .bind(member.created_at_ms.as_i64())
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn get_member(&self, id: &MemberId) -> Result<Option<Member>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM members WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| member_from_row(&r)))
    }

    /// Transaction-scoped member read, so eligibility checks and the credits
    /// that follow them see one snapshot.
    pub async fn get_member_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &MemberId,
    ) -> Result<Option<Member>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM members WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(conn)
            .await?;
        Ok(row.map(|r| member_from_row(&r)))
    }

    /// Claim a child slot with a compare-and-set: the update only lands if
    /// the slot is still open. Returns false when a racer won the slot.
    pub async fn claim_child_slot_tx(
        &self,
        conn: &mut SqliteConnection,
        parent: &MemberId,
        slot: Slot,
        child: &MemberId,
    ) -> Result<bool, sqlx::Error> {
        let sql = match slot {
            Slot::Left => {
                "UPDATE members SET left_child_id = ? WHERE id = ? AND left_child_id IS NULL"
            }
            Slot::Right => {
                "UPDATE members SET right_child_id = ? WHERE id = ? AND right_child_id IS NULL"
            }
        };

        let result = sqlx::query(sql)
            .bind(child.as_str())
            .bind(parent.as_str())
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a package purchase/upgrade on the member row.
    pub async fn set_member_package_tx(
        &self,
        conn: &mut SqliteConnection,
        member: &MemberId,
        package: &PackageId,
        purchased_at: TimeMs,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE members SET package_id = ?, package_purchased_at_ms = ? WHERE id = ?",
        )
        .bind(package.as_str())
        .bind(purchased_at.as_i64())
        .bind(member.as_str())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Bump `total_earnings` by a credited amount.
    ///
    /// Read-add-write on the stored canonical decimal; safe because SQLite
    /// allows a single writer and this only runs inside the distribution
    /// transaction. Returns false if the member row is missing.
    pub async fn add_earnings_tx(
        &self,
        conn: &mut SqliteConnection,
        member: &MemberId,
        amount: Decimal,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT total_earnings FROM members WHERE id = ?")
            .bind(member.as_str())
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        let current: String = row.get("total_earnings");
        let updated = parse_decimal("total_earnings", &current) + amount;

        sqlx::query("UPDATE members SET total_earnings = ? WHERE id = ?")
            .bind(updated.to_canonical_string())
            .bind(member.as_str())
            .execute(conn)
            .await?;

        Ok(true)
    }

    // =========================================================================
    // Package catalog operations
    // =========================================================================

    pub async fn insert_package(&self, package: &Package) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO packages (id, name, price, point_value, max_milestone, active_days)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(package.id.as_str())
        .bind(&package.name)
        .bind(package.price.to_canonical_string())
        .bind(package.point_value.to_canonical_string())
        .bind(package.max_milestone.map(|m| m.to_canonical_string()))
        .bind(package.active_days)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_package(&self, id: &PackageId) -> Result<Option<Package>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM packages WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| package_from_row(&r)))
    }

    pub async fn get_package_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &PackageId,
    ) -> Result<Option<Package>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM packages WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(conn)
            .await?;
        Ok(row.map(|r| package_from_row(&r)))
    }

    pub async fn list_packages(&self) -> Result<Vec<Package>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM packages ORDER BY price ASC, id ASC")
            .fetch_all(self.pool())
            .await?;
        Ok(rows.iter().map(package_from_row).collect())
    }

    // =========================================================================
    // Commission rate operations
    // =========================================================================

    pub async fn upsert_rate(&self, rate: &CommissionRate) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO commission_rates (level, rate)
            VALUES (?, ?)
            ON CONFLICT(level) DO UPDATE SET rate = excluded.rate
            "#,
        )
        .bind(rate.level)
        .bind(rate.rate.to_canonical_string())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn load_rates(&self) -> Result<RateTable, sqlx::Error> {
        let rows = sqlx::query("SELECT level, rate FROM commission_rates ORDER BY level ASC")
            .fetch_all(self.pool())
            .await?;
        Ok(RateTable::new(rows.iter().map(rate_from_row).collect()))
    }

    pub async fn load_rates_tx(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<RateTable, sqlx::Error> {
        let rows = sqlx::query("SELECT level, rate FROM commission_rates ORDER BY level ASC")
            .fetch_all(conn)
            .await?;
        Ok(RateTable::new(rows.iter().map(rate_from_row).collect()))
    }

    pub async fn list_rates(&self) -> Result<Vec<CommissionRate>, sqlx::Error> {
        let rows = sqlx::query("SELECT level, rate FROM commission_rates ORDER BY level ASC")
            .fetch_all(self.pool())
            .await?;
        Ok(rows.iter().map(rate_from_row).collect())
    }
}

fn rate_from_row(row: &SqliteRow) -> CommissionRate {
    let rate: String = row.get("rate");
    CommissionRate {
        level: row.get("level"),
        rate: parse_decimal("rate", &rate),
    }
}
