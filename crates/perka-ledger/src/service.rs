//! Authorization-aware facade over the ledger store.
//!
//! The facade never trusts the request body for identity: the requester's
//! uuid comes from a token the SSO already validated, and non-admin
//! requesters are pinned to their own account no matter what the request
//! says.

use std::sync::Arc;

use log::{info, warn};
use perka_commons::UserId;
use perka_sso_client::{claims, SsoGateway};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{LedgerRequest, LoyaltyAccount, Requester};
use crate::operation::Operation;
use crate::store::LedgerStore;

/// The loyalty-points service.
pub struct LoyaltyService {
    store: Arc<dyn LedgerStore>,
    sso: Arc<dyn SsoGateway>,
}

impl LoyaltyService {
    pub fn new(store: Arc<dyn LedgerStore>, sso: Arc<dyn SsoGateway>) -> Self {
        Self { store, sso }
    }

    /// Establishes who a token belongs to and whether they are an admin.
    ///
    /// Call order is fixed: the authority validates the token remotely
    /// first; only then are the claims re-parsed locally (unverified) to
    /// extract the uid, and only then is the admin flag looked up.
    pub async fn authorize(&self, token: &str) -> LedgerResult<Requester> {
        if !self.sso.is_jwt_valid(token).await {
            warn!("rejected request with invalid token");
            return Err(LedgerError::Unauthorized);
        }

        let claims = claims::parse_unverified(token).map_err(|e| {
            // The authority accepted this exact string, so a local parse
            // failure means the services disagree about the claim shape.
            warn!("claims extraction failed on a validated token: {}", e);
            LedgerError::Unauthorized
        })?;

        let is_admin = self.sso.is_admin(claims.uid).await;
        Ok(Requester {
            id: claims.uid,
            is_admin,
        })
    }

    /// Applies one ledger mutation on behalf of `requester`.
    ///
    /// Admins operate on the request's target as given. Non-admins may not
    /// deposit, and any other operation they request is forced onto their
    /// own account.
    pub async fn add_loyalty(
        &self,
        requester: &Requester,
        request: LedgerRequest,
    ) -> LedgerResult<LoyaltyAccount> {
        let target = if requester.is_admin {
            request.target
        } else {
            if request.operation == Operation::Deposit {
                warn!("non-admin {} attempted a deposit", requester.id);
                return Err(LedgerError::OnlyAdminsMayDeposit);
            }
            requester.id
        };

        let account = self
            .store
            .add_loyalty(target, request.operation, request.amount, &request.comment)
            .await?;
        info!(
            "applied {} of {} to {}: balance {}",
            request.operation, request.amount, target, account.balance
        );
        Ok(account)
    }

    /// Reads a balance under the same self-or-admin targeting rule.
    pub async fn get_loyalty(
        &self,
        requester: &Requester,
        target: UserId,
    ) -> LedgerResult<LoyaltyAccount> {
        let target = if requester.is_admin {
            target
        } else {
            requester.id
        };
        self.store.get_loyalty(target).await
    }

    /// `authorize` + `add_loyalty` in one call, for transport handlers.
    pub async fn add_loyalty_with_token(
        &self,
        token: &str,
        request: LedgerRequest,
    ) -> LedgerResult<LoyaltyAccount> {
        let requester = self.authorize(token).await?;
        self.add_loyalty(&requester, request).await
    }

    /// `authorize` + `get_loyalty` in one call, for transport handlers.
    pub async fn get_loyalty_with_token(
        &self,
        token: &str,
        target: UserId,
    ) -> LedgerResult<LoyaltyAccount> {
        let requester = self.authorize(token).await?;
        self.get_loyalty(&requester, target).await
    }

    /// Connectivity probe, delegated to the store.
    pub async fn health_check(&self) -> LedgerResult<()> {
        self.store.health_check().await
    }
}
