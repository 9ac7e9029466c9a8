/// Errors produced by the auth service and token validator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately a single variant so a
    /// caller cannot enumerate registered emails.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration hit the email uniqueness constraint.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No user with the given id.
    #[error("user not found")]
    UserNotFound,

    /// The token was revoked before its natural expiry.
    #[error("token has been revoked")]
    TokenRevoked,

    /// Signature verification failed or the claims are malformed.
    #[error("failed to parse token")]
    TokenParsing,

    /// The token's `exp` is in the past.
    #[error("token ttl expired")]
    TokenTtlExpired,

    /// `token_type` is not one of "access" / "refresh", or the operation
    /// requires the other kind.
    #[error("token wrong type")]
    TokenWrongType,

    /// bcrypt failed. Infrastructure-side, never a client error.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The user directory or revocation store is unreachable or misbehaving.
    #[error("storage error: {0}")]
    Storage(String),

    /// The operation's time budget elapsed; downstream calls were cancelled.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Unexpected state that does not fit the taxonomy above.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
