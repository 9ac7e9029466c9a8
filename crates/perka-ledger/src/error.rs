/// Errors produced by the ledger store and the authorization facade.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// No loyalty account for the given uuid. Deposits and withdrawals
    /// against nonexistent accounts are forbidden.
    #[error("user not found")]
    UserNotFound,

    /// The mutation would have taken the balance below zero. The
    /// transaction was rolled back; nothing was written.
    #[error("negative balance")]
    NegativeBalance,

    /// The operation code is not one of "registration" / "d" / "w", or a
    /// "registration" was replayed against an existing account.
    #[error("wrong param type")]
    WrongParamType,

    /// A non-admin requester attempted a deposit.
    #[error("only admins may deposit")]
    OnlyAdminsMayDeposit,

    /// The token authority rejected the presented token.
    #[error("unauthorized")]
    Unauthorized,

    /// The ledger database is unreachable or misbehaving.
    #[error("storage error: {0}")]
    Storage(String),

    /// Unexpected state that does not fit the taxonomy above.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using LedgerError.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
