//! perka's loyalty-points ledger.
//!
//! Responsibilities:
//! - Transactional account + transaction-log persistence under per-account
//!   row locks (`PgLedgerStore`)
//! - The non-negative-balance invariant, enforced by the database CHECK
//!   constraint and surfaced as `NegativeBalance`
//! - SSO-backed authorization: admins operate anywhere, non-admins only
//!   withdraw from their own account

pub mod error;
pub mod models;
pub mod operation;
pub mod service;
pub mod store;

pub use error::{LedgerError, LedgerResult};
pub use models::{LedgerRequest, LoyaltyAccount, Requester};
pub use operation::Operation;
pub use service::LoyaltyService;
pub use store::{LedgerStore, PgLedgerStore};
