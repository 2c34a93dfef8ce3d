//! Package catalog types.

use serde::{Deserialize, Serialize};

use super::{Decimal, PackageId};

/// A purchasable package tier.
///
/// `max_milestone` is the lifetime earnings cap for a holder of this package;
/// `None` marks the unlimited top tier. Rows are immutable once referenced by
/// a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    pub price: Decimal,
    pub point_value: Decimal,
    pub max_milestone: Option<Decimal>,
    pub active_days: i64,
}

impl Package {
    pub fn is_unlimited(&self) -> bool {
        self.max_milestone.is_none()
    }

    /// Validity window end, given when the holder purchased it.
    pub fn expires_at_ms(&self, purchased_at_ms: i64) -> i64 {
        purchased_at_ms + self.active_days * 86_400_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_expiry_window() {
        let pkg = Package {
            id: PackageId::new("gold"),
            name: "Gold".to_string(),
            price: Decimal::from_str("500").unwrap(),
            point_value: Decimal::from_str("50").unwrap(),
            max_milestone: Some(Decimal::from_str("5000").unwrap()),
            active_days: 30,
        };
        assert_eq!(pkg.expires_at_ms(1_000), 1_000 + 30 * 86_400_000);
        assert!(!pkg.is_unlimited());
    }
}
