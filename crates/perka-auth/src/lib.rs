//! perka's token authority and authentication core.
//!
//! Responsibilities:
//! - Sign and validate HS256 tokens (access + single-use refresh)
//! - Register, login, refresh, logout, validate, is_admin
//! - Revoke tokens for exactly their remaining lifetime
//! - Drain the event publisher's delivery reports into user message status
//!
//! The user directory, revocation store and event publisher are external;
//! this crate defines their capability traits and consumes them through
//! constructor injection.

pub mod error;
pub mod jwt;
pub mod password;
pub mod service;
pub mod storage;

pub use error::{AuthError, AuthResult};
pub use jwt::{TokenClaims, TokenCodec, TokenType, TokenValidator};
pub use service::{AuthService, RegisterRequest, TokenPair, UserWithTokens};
pub use storage::{RevocationStore, UserDirectory};
