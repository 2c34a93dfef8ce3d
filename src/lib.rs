pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Activity, CommissionRate, Decimal, EventKey, EventKind, Member, MemberId, MilestoneState,
    Package, PackageId, RateTable, Slot, TimeMs, Transaction, TransactionStatus, TransactionType,
    WalletType,
};
pub use engine::{
    Distributor, Enrollment, PlacementEngine, TriggerEvent, Upline,
};
pub use error::AppError;
