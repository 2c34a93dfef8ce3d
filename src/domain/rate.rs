//! Commission rate table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Decimal;

/// Level 0 is reserved for the house/company account.
pub const HOUSE_LEVEL: i64 = 0;

/// One configured payout rate: level 0 = house, 1..N = upline depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate {
    pub level: i64,
    pub rate: Decimal,
}

/// The full configured table, keyed by level.
///
/// A missing level means that depth earns nothing; it is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<i64, Decimal>,
}

impl RateTable {
    pub fn new(rows: Vec<CommissionRate>) -> Self {
        let rates = rows.into_iter().map(|r| (r.level, r.rate)).collect();
        RateTable { rates }
    }

    pub fn rate_for(&self, level: i64) -> Option<Decimal> {
        self.rates.get(&level).copied()
    }

    pub fn house_rate(&self) -> Option<Decimal> {
        self.rate_for(HOUSE_LEVEL)
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Sum of all configured rates; a sane table stays at or below 1.
    pub fn total(&self) -> Decimal {
        self.rates
            .values()
            .fold(Decimal::zero(), |acc, r| acc + *r)
    }
}
