//! The authentication core: registration, login, token rotation, revocation,
//! and the supervised delivery-report drain task.
//!
//! The service is stateless per request; the only long-lived state it owns is
//! the background task consuming the event publisher's delivery reports. The
//! task starts in the constructor and stops when `shutdown()` is called.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{error, info, warn};
use perka_broker::{DeliveryReport, EventPublisher, RegistrationEvent};
use perka_commons::config::{HandlerTimeouts, ServiceConfig};
use perka_commons::{MessageStatus, User, UserId};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::{AuthError, AuthResult};
use crate::jwt::{TokenClaims, TokenCodec, TokenType, TokenValidator};
use crate::password::{hash_password, verify_password};
use crate::storage::{RevocationStore, UserDirectory};

/// Registration input.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Display name, forwarded to the registration event only — the user
    /// directory does not store it.
    pub name: Option<String>,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// A user plus the token pair minted for them.
#[derive(Debug, Clone)]
pub struct UserWithTokens {
    pub user: User,
    pub tokens: TokenPair,
}

/// Drain task state.
enum DrainState {
    Stopped,
    Running(JoinHandle<()>),
}

/// The perka authentication service.
///
/// All operations are safe to call concurrently; shared mutable state lives
/// only in the injected stores. Each of register/login/refresh/logout runs
/// under its own configured time budget, and an elapsed budget cancels the
/// in-flight downstream calls.
pub struct AuthService {
    codec: TokenCodec,
    validator: TokenValidator,
    users: Arc<dyn UserDirectory>,
    revocation: Arc<dyn RevocationStore>,
    publisher: Arc<dyn EventPublisher>,
    timeouts: HandlerTimeouts,
    registration_topic: String,
    bcrypt_cost: u32,
    drain_state: Mutex<DrainState>,
    shutdown: Arc<Notify>,
}

impl AuthService {
    /// Builds the service and starts the delivery-report drain task.
    ///
    /// The task consumes the publisher's report channel for the service's
    /// lifetime: per-message failures mark the originating user "failed",
    /// successes mark it "successful", and transport-level broker errors are
    /// only logged (there is no user to update). Call [`shutdown`] to stop
    /// it.
    ///
    /// [`shutdown`]: AuthService::shutdown
    pub fn new(
        cfg: &ServiceConfig,
        users: Arc<dyn UserDirectory>,
        revocation: Arc<dyn RevocationStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let codec = TokenCodec::from_settings(&cfg.auth);
        let validator = TokenValidator::new(codec.clone(), revocation.clone());
        let shutdown = Arc::new(Notify::new());

        let drain_state = match publisher.take_delivery_reports() {
            Some(reports) => {
                let handle =
                    Self::spawn_drain_task(reports, users.clone(), shutdown.clone());
                Mutex::new(DrainState::Running(handle))
            }
            None => {
                warn!("delivery-report channel already consumed; drain task not started");
                Mutex::new(DrainState::Stopped)
            }
        };

        Self {
            codec,
            validator,
            users,
            revocation,
            publisher,
            timeouts: cfg.timeouts.clone(),
            registration_topic: cfg.broker.registration_topic.clone(),
            bcrypt_cost: cfg.auth.bcrypt_cost,
            drain_state,
            shutdown,
        }
    }

    fn spawn_drain_task(
        mut reports: perka_broker::DeliveryReportReceiver,
        users: Arc<dyn UserDirectory>,
        shutdown: Arc<Notify>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    report = reports.recv() => match report {
                        Some(DeliveryReport::Delivered { user_id }) => {
                            if let Err(e) = users
                                .update_send_status(user_id, MessageStatus::Successful)
                                .await
                            {
                                error!("failed to update message status for {}: {}", user_id, e);
                            }
                        }
                        Some(DeliveryReport::Failed { user_id, error: cause }) => {
                            error!("broker rejected message for {}: {}", user_id, cause);
                            if let Err(e) = users
                                .update_send_status(user_id, MessageStatus::Failed)
                                .await
                            {
                                error!("failed to update message status for {}: {}", user_id, e);
                            }
                        }
                        Some(DeliveryReport::BrokerError { error: cause }) => {
                            // Instance-level failure: no message, no user to update.
                            error!("broker error: {}", cause);
                        }
                        None => {
                            info!("delivery-report channel closed; drain task exiting");
                            break;
                        }
                    },
                    _ = shutdown.notified() => break,
                }
            }
        })
    }

    /// Stops the drain task and waits for it to finish.
    pub async fn shutdown(&self) -> AuthResult<()> {
        self.shutdown.notify_one();

        let handle = {
            let mut state = self
                .drain_state
                .lock()
                .map_err(|e| AuthError::Internal(format!("drain state lock poisoned: {}", e)))?;
            match std::mem::replace(&mut *state, DrainState::Stopped) {
                DrainState::Running(handle) => Some(handle),
                DrainState::Stopped => None,
            }
        };

        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| AuthError::Internal(format!("failed to join drain task: {}", e)))?;
        }
        Ok(())
    }

    /// Registers a new user.
    ///
    /// Publish failure is non-fatal: the registration event's status degrades
    /// to "failed" but the user is created and tokens are issued regardless.
    pub async fn register(&self, req: RegisterRequest) -> AuthResult<UserWithTokens> {
        self.with_timeout(self.timeouts.register(), "register", self.register_inner(req))
            .await
    }

    async fn register_inner(&self, req: RegisterRequest) -> AuthResult<UserWithTokens> {
        let pass_hash = hash_password(&req.password, Some(self.bcrypt_cost)).await?;
        let user_id = self.users.save_user(&req.email, &pass_hash).await?;
        info!("user {} registered", user_id);

        let event = RegistrationEvent {
            user_id,
            email: req.email.clone(),
            full_name: req.name,
        };
        if let Err(e) = self
            .publisher
            .send(&event, &self.registration_topic, user_id)
            .await
        {
            // Soft degradation: the broker being down must not fail
            // registration. Only the async status flag records the miss.
            error!("sending registration event to broker failed: {}", e);
            if let Err(e) = self
                .users
                .update_send_status(user_id, MessageStatus::Failed)
                .await
            {
                error!("failed to update message status for {}: {}", user_id, e);
            }
        }

        self.issue_pair_for_email(&req.email).await
    }

    /// Authenticates a user by email and password.
    ///
    /// Unknown email and wrong password are indistinguishable: both surface
    /// as `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<UserWithTokens> {
        self.with_timeout(
            self.timeouts.login(),
            "login",
            self.login_inner(email, password),
        )
        .await
    }

    async fn login_inner(&self, email: &str, password: &str) -> AuthResult<UserWithTokens> {
        let user = match self.users.get_user_by_email(email).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => {
                warn!("login with unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !verify_password(password, &user.pass_hash).await? {
            warn!("invalid credentials for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_pair(&user)?;
        Ok(UserWithTokens { user, tokens })
    }

    /// Rotates a refresh token: validates it, issues a brand-new pair, then
    /// revokes the presented token for its remaining lifetime. Refresh
    /// tokens are single-use.
    pub async fn refresh(&self, token: &str) -> AuthResult<UserWithTokens> {
        self.with_timeout(self.timeouts.refresh(), "refresh", self.refresh_inner(token))
            .await
    }

    async fn refresh_inner(&self, token: &str) -> AuthResult<UserWithTokens> {
        let claims = self.validator.validate(token).await?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::TokenWrongType);
        }

        let issued = self.issue_pair_for_email(&claims.email).await?;

        self.revocation
            .save_token(token, claims.remaining_ttl())
            .await?;
        info!("refresh token rotated for user {}", issued.user.id);
        Ok(issued)
    }

    /// Revokes a token (either kind) for its remaining lifetime.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        self.with_timeout(self.timeouts.logout(), "logout", self.logout_inner(token))
            .await
    }

    async fn logout_inner(&self, token: &str) -> AuthResult<()> {
        let claims = self.validator.validate(token).await?;
        self.revocation
            .save_token(token, claims.remaining_ttl())
            .await?;
        info!("token revoked for user {}", claims.uid);
        Ok(())
    }

    /// Runs the full validation chain and returns the parsed claims.
    pub async fn validate(&self, token: &str) -> AuthResult<TokenClaims> {
        self.validator.validate(token).await
    }

    /// Returns the stored admin flag for `user_id`.
    pub async fn is_admin(&self, user_id: UserId) -> AuthResult<bool> {
        let user = self.users.get_user(user_id).await?;
        Ok(user.is_admin)
    }

    /// Connectivity probe, delegated to the user directory.
    pub async fn health_check(&self) -> AuthResult<()> {
        self.users.health_check().await
    }

    fn issue_pair(&self, user: &User) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.codec.issue(user, TokenType::Access)?,
            refresh_token: self.codec.issue(user, TokenType::Refresh)?,
        })
    }

    async fn issue_pair_for_email(&self, email: &str) -> AuthResult<UserWithTokens> {
        let user = match self.users.get_user_by_email(email).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e),
        };
        let tokens = self.issue_pair(&user)?;
        Ok(UserWithTokens { user, tokens })
    }

    async fn with_timeout<T>(
        &self,
        budget: Duration,
        op: &'static str,
        fut: impl Future<Output = AuthResult<T>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(budget, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} exceeded its {}ms budget", op, budget.as_millis());
                Err(AuthError::Timeout(op))
            }
        }
    }
}
