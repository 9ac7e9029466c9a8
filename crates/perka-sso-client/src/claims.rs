//! Local, signature-free claim extraction.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use perka_commons::UserId;
use serde::Deserialize;

use crate::error::SsoClientError;

/// uid/email pulled out of a token without verifying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedClaims {
    pub uid: UserId,
    pub email: String,
}

#[derive(Deserialize)]
struct RawClaims {
    uid: String,
    email: String,
}

/// Extracts `uid` and `email` from a token WITHOUT verifying its signature.
///
/// Only call this after the token authority has validated the token
/// remotely — the identity extracted here is trusted purely because
/// `is_jwt_valid` already said yes to the exact same string.
pub fn parse_unverified(token: &str) -> Result<UnverifiedClaims, SsoClientError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    // The key is irrelevant with signature validation disabled.
    let key = DecodingKey::from_secret(b"");
    let data = decode::<RawClaims>(token, &key, &validation)
        .map_err(|e| SsoClientError::Claims(e.to_string()))?;

    let uid = UserId::parse(&data.claims.uid)
        .map_err(|e| SsoClientError::Claims(e.to_string()))?;
    Ok(UnverifiedClaims {
        uid,
        email: data.claims.email,
    })
}
