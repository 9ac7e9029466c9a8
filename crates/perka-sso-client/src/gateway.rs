//! The gateway trait and its two adapters.

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use perka_auth::AuthService;
use perka_commons::UserId;
use serde::{Deserialize, Serialize};

/// Remote access to the token authority's Validate and IsAdmin.
///
/// Both calls degrade to `false` on any failure: an unreachable authority
/// means nobody is authenticated and nobody is an admin.
#[async_trait]
pub trait SsoGateway: Send + Sync {
    /// Runs the authority's full validation chain over `token`.
    async fn is_jwt_valid(&self, token: &str) -> bool;

    /// Returns the stored admin flag for `user_id`.
    async fn is_admin(&self, user_id: UserId) -> bool;
}

/// HTTP adapter for a remote perka authority.
pub struct HttpSsoGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct ValidateResponse {
    success: bool,
}

#[derive(Serialize)]
struct IsAdminRequest {
    user_id: UserId,
}

#[derive(Deserialize)]
struct IsAdminResponse {
    is_admin: bool,
}

impl HttpSsoGateway {
    /// `base_url` without a trailing slash, e.g. `http://sso:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, reqwest::Error> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json::<Resp>()
            .await
    }
}

#[async_trait]
impl SsoGateway for HttpSsoGateway {
    async fn is_jwt_valid(&self, token: &str) -> bool {
        let result: Result<ValidateResponse, _> = self
            .post_json("/v1/auth/validate", &ValidateRequest { token })
            .await;
        match result {
            Ok(resp) => resp.success,
            Err(e) => {
                warn!("validate call to sso failed: {}", e);
                false
            }
        }
    }

    async fn is_admin(&self, user_id: UserId) -> bool {
        let result: Result<IsAdminResponse, _> = self
            .post_json("/v1/auth/is_admin", &IsAdminRequest { user_id })
            .await;
        match result {
            Ok(resp) => resp.is_admin,
            Err(e) => {
                warn!("is_admin call to sso failed: {}", e);
                false
            }
        }
    }
}

/// In-process adapter over a co-deployed [`AuthService`].
///
/// Same contract as the HTTP adapter, minus the network.
pub struct LocalSsoGateway {
    auth: Arc<AuthService>,
}

impl LocalSsoGateway {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl SsoGateway for LocalSsoGateway {
    async fn is_jwt_valid(&self, token: &str) -> bool {
        self.auth.validate(token).await.is_ok()
    }

    async fn is_admin(&self, user_id: UserId) -> bool {
        match self.auth.is_admin(user_id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!("is_admin lookup failed for {}: {}", user_id, e);
                false
            }
        }
    }
}
