//! Ledger domain types.

use perka_commons::UserId;
use serde::{Deserialize, Serialize};

use crate::operation::Operation;

/// A loyalty account: per-user balance. The uuid IS the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    pub uuid: UserId,
    pub balance: i64,
}

/// A requested ledger mutation, as it arrives from a client.
///
/// `target` is untrusted input; the facade overrides it for non-admin
/// requesters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRequest {
    pub target: UserId,
    pub operation: Operation,
    pub amount: i64,
    #[serde(default)]
    pub comment: String,
}

/// The authenticated identity a ledger call runs as.
///
/// Built by `LoyaltyService::authorize` from a token the authority already
/// validated — never from the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: UserId,
    pub is_admin: bool,
}
