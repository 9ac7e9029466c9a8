/// Errors produced by the SSO client adapters.
#[derive(Debug, thiserror::Error)]
pub enum SsoClientError {
    /// The remote authority could not be reached or answered garbage.
    #[error("sso transport error: {0}")]
    Transport(String),

    /// The token's claims could not be extracted.
    #[error("failed to extract claims: {0}")]
    Claims(String),
}
