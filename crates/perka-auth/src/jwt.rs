// JWT issuance and the four-step validation chain

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use perka_commons::config::AuthSettings;
use perka_commons::{User, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::storage::RevocationStore;

/// Token kind, carried in the `token_type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims exactly as they sit on the wire.
///
/// `token_type` stays a loose string here: an unknown value must surface as
/// `TokenWrongType` from the validation chain, not as a deserialization
/// failure.
#[derive(Debug, Serialize, Deserialize)]
struct RawClaims {
    token_type: Option<String>,
    uid: String,
    email: String,
    exp: i64,
}

/// Validated, well-formed token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub token_type: TokenType,
    pub uid: UserId,
    pub email: String,
    /// Expiry as unix seconds.
    pub exp: i64,
}

impl TokenClaims {
    /// Lifetime left on the token right now. Zero once expired.
    ///
    /// This is the TTL a revocation record gets, so a revoked token's marker
    /// disappears exactly when the token would have expired anyway.
    pub fn remaining_ttl(&self) -> Duration {
        let left = self.exp - chrono::Utc::now().timestamp();
        Duration::from_secs(left.max(0) as u64)
    }
}

/// Signs and parses perka tokens (HS256 over the shared service secret).
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.service_secret.clone(),
            settings.access_token_ttl(),
            settings.refresh_token_ttl(),
        )
    }

    /// Issues a signed token for `user` with claims
    /// `{token_type, uid, email, exp}`; `exp` is now plus the access or
    /// refresh lifetime depending on `token_type`.
    pub fn issue(&self, user: &User, token_type: TokenType) -> AuthResult<String> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let exp = chrono::Utc::now().timestamp() + ttl.as_secs() as i64;
        let claims = RawClaims {
            token_type: Some(token_type.as_str().to_string()),
            uid: user.id.to_string(),
            email: user.email.clone(),
            exp,
        };

        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&header, &claims, &key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {}", e)))
    }

    /// Verifies the signature and claim shape, nothing more.
    ///
    /// Expiry is NOT checked here — the validation chain orders the ttl
    /// check after signature verification and reports it distinctly.
    fn decode_raw(&self, token: &str) -> AuthResult<RawClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let data =
            decode::<RawClaims>(token, &key, &validation).map_err(|_| AuthError::TokenParsing)?;
        Ok(data.claims)
    }
}

/// Runs the full validation chain over a presented token.
///
/// The steps run in order and short-circuit on the first failure:
/// 1. signature verification → `TokenParsing`
/// 2. expiry → `TokenTtlExpired`
/// 3. `token_type` ∈ {access, refresh} → `TokenWrongType`
/// 4. revocation-store lookup by the exact token string → `TokenRevoked`
pub struct TokenValidator {
    codec: TokenCodec,
    revocation: Arc<dyn RevocationStore>,
}

impl TokenValidator {
    pub fn new(codec: TokenCodec, revocation: Arc<dyn RevocationStore>) -> Self {
        Self { codec, revocation }
    }

    pub async fn validate(&self, token: &str) -> AuthResult<TokenClaims> {
        let raw = self.codec.decode_raw(token)?;
        // Claims well-formedness is part of parsing: a signed token whose uid
        // is not a uuid is malformed, not merely unauthorized.
        let uid = UserId::parse(&raw.uid).map_err(|_| AuthError::TokenParsing)?;

        if raw.exp - chrono::Utc::now().timestamp() < 0 {
            return Err(AuthError::TokenTtlExpired);
        }

        let token_type = match raw.token_type.as_deref() {
            Some("access") => TokenType::Access,
            Some("refresh") => TokenType::Refresh,
            _ => return Err(AuthError::TokenWrongType),
        };

        if self.revocation.check_token_exists(token).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(TokenClaims {
            token_type,
            uid,
            email: raw.email,
            exp: raw.exp,
        })
    }
}
