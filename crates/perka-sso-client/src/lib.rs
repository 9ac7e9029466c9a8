//! Client adapters for the perka token authority.
//!
//! Services that trust the SSO for identity decisions consume the
//! [`SsoGateway`] trait. For any request mutating protected state the call
//! order is fixed:
//!
//! 1. `is_jwt_valid(token)` — the authority runs the full validation chain
//!    (signature, ttl, type, revocation) remotely
//! 2. only then may [`claims::parse_unverified`] re-parse the token locally
//!    to extract uid/email — trust was already established in step 1
//! 3. `is_admin(uid)` — selects the authorization branch
//!
//! Two adapters are provided: [`HttpSsoGateway`] for a remote authority and
//! [`LocalSsoGateway`] for co-deployed setups where the auth service lives
//! in the same process.

pub mod claims;
mod error;
mod gateway;

pub use claims::UnverifiedClaims;
pub use error::SsoClientError;
pub use gateway::{HttpSsoGateway, LocalSsoGateway, SsoGateway};
