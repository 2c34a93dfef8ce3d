//! Domain primitives: MemberId, PackageId, EventKey, TimeMs, and ledger enums.

use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Opaque member identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        MemberId(id.into())
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        MemberId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Package catalog identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId(pub String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        PackageId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Idempotency key of a qualifying event (payment confirmation id or similar).
///
/// The distributor keys exactly-once crediting on this value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey(pub String);

impl EventKey {
    pub fn new(key: impl Into<String>) -> Self {
        EventKey(key.into())
    }

    pub fn generate() -> Self {
        EventKey(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which ledger bucket a transaction touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletType {
    Company,
    Register,
    Bonus,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::Company => "COMPANY",
            WalletType::Register => "REGISTER",
            WalletType::Bonus => "BONUS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COMPANY" => Some(WalletType::Company),
            "REGISTER" => Some(WalletType::Register),
            "BONUS" => Some(WalletType::Bonus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Registration,
    Upgrade,
    Commission,
    WalletTransfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Registration => "REGISTRATION",
            TransactionType::Upgrade => "UPGRADE",
            TransactionType::Commission => "COMMISSION",
            TransactionType::WalletTransfer => "WALLET_TRANSFER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REGISTRATION" => Some(TransactionType::Registration),
            "UPGRADE" => Some(TransactionType::Upgrade),
            "COMMISSION" => Some(TransactionType::Commission),
            "WALLET_TRANSFER" => Some(TransactionType::WalletTransfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TransactionStatus::Pending),
            "COMPLETED" => Some(TransactionStatus::Completed),
            "FAILED" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// Kind of qualifying event that triggers a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Registration,
    Upgrade,
}

impl EventKind {
    /// The transaction type used for the purchaser's spend record.
    pub fn spend_transaction_type(&self) -> TransactionType {
        match self {
            EventKind::Registration => TransactionType::Registration,
            EventKind::Upgrade => TransactionType::Upgrade,
        }
    }
}

/// Which of a parent's two binary-tree slots a member occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Left => "left",
            Slot::Right => "right",
        }
    }
}
