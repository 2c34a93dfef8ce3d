//! The placement and commission engines.
//!
//! - `placement`   - breadth-first binary-tree placement with CAS slot claims
//! - `upline`      - referral-chain walk with milestone compression
//! - `distributor` - commission computation and atomic ledger application
//! - `enrollment`  - registration/upgrade orchestration over the above

pub mod distributor;
pub mod enrollment;
pub mod placement;
pub mod upline;

pub use distributor::{compute_credits, Credit, DistributionError, Distributor, TriggerEvent};
pub use enrollment::{
    Enrollment, EnrollmentError, PurchaseRequest, RegistrationOutcome, RegistrationRequest,
};
pub use placement::{Placement, PlacementEngine, PlacementError};
pub use upline::{resolve_uplines, Upline, UplineError};
