//! Capability traits for the auth service's external stores.
//!
//! Both stores live outside this codebase (a relational user directory and a
//! TTL-capable key-value store). The service only ever sees these traits,
//! injected through its constructor.

use std::time::Duration;

use async_trait::async_trait;
use perka_commons::{MessageStatus, User, UserId};

use crate::error::AuthResult;

/// Relational store of registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Persists a new user and returns its id.
    ///
    /// Implementations must translate their unique-violation error on
    /// `email` into `AuthError::UserAlreadyExists`.
    async fn save_user(&self, email: &str, pass_hash: &str) -> AuthResult<UserId>;

    /// Fetches a user by id; `AuthError::UserNotFound` when absent.
    async fn get_user(&self, id: UserId) -> AuthResult<User>;

    /// Fetches a user by email; `AuthError::UserNotFound` when absent.
    async fn get_user_by_email(&self, email: &str) -> AuthResult<User>;

    /// Records the delivery status of the user's registration event.
    async fn update_send_status(&self, id: UserId, status: MessageStatus) -> AuthResult<()>;

    /// Ping-style connectivity probe.
    async fn health_check(&self) -> AuthResult<()>;
}

/// TTL key-value store holding revoked tokens.
///
/// Keys are raw token strings; values are opaque markers. Entries expire on
/// their own once the revoked token would have expired anyway, so the store
/// never needs cleanup.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks `token` revoked for `ttl` (its remaining lifetime).
    async fn save_token(&self, token: &str, ttl: Duration) -> AuthResult<()>;

    /// Returns the stored marker, if any.
    async fn get_token(&self, token: &str) -> AuthResult<Option<String>>;

    /// True when a revocation record for `token` exists.
    async fn check_token_exists(&self, token: &str) -> AuthResult<bool>;
}
