//! In-memory fakes for the auth service's external collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use perka_auth::{AuthError, AuthResult, RevocationStore, UserDirectory};
use perka_broker::{
    DeliveryReport, DeliveryReportReceiver, EventPublisher, PublishError, RegistrationEvent,
};
use perka_commons::{MessageStatus, User, UserId};
use tokio::sync::mpsc;

/// In-memory user directory with an optional artificial latency on writes,
/// used to exercise the per-operation time budgets.
pub struct MemoryUserDirectory {
    users: Mutex<HashMap<UserId, User>>,
    latency: Option<Duration>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            latency: None,
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            latency: Some(latency),
        }
    }

    /// Flips the admin flag for an existing user.
    pub fn set_admin(&self, id: UserId, is_admin: bool) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.is_admin = is_admin;
        }
    }

    pub fn status_of(&self, id: UserId) -> Option<MessageStatus> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .map(|u| u.message_status)
    }

    async fn maybe_sleep(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn save_user(&self, email: &str, pass_hash: &str) -> AuthResult<UserId> {
        self.maybe_sleep().await;
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(AuthError::UserAlreadyExists);
        }
        let user = User {
            id: UserId::generate(),
            email: email.to_string(),
            pass_hash: pass_hash.to_string(),
            is_admin: false,
            message_status: MessageStatus::Pending,
        };
        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    async fn get_user(&self, id: UserId) -> AuthResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> AuthResult<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_send_status(&self, id: UserId, status: MessageStatus) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        user.message_status = status;
        Ok(())
    }

    async fn health_check(&self) -> AuthResult<()> {
        Ok(())
    }
}

/// In-memory revocation store honoring TTLs on read.
pub struct MemoryRevocationStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn save_token(&self, token: &str, ttl: Duration) -> AuthResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(token.to_string(), Instant::now() + ttl);
        Ok(())
    }

    async fn get_token(&self, token: &str) -> AuthResult<Option<String>> {
        Ok(self
            .check_token_exists(token)
            .await?
            .then(|| "revoked".to_string()))
    }

    async fn check_token_exists(&self, token: &str) -> AuthResult<bool> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(token)
            .map(|deadline| *deadline > Instant::now())
            .unwrap_or(false))
    }
}

/// What the fake publisher does with a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherBehavior {
    /// Enqueue succeeds and the broker acks the message.
    AckDelivered,
    /// Enqueue succeeds but the broker later rejects the message.
    AckFailed,
    /// The local enqueue itself fails.
    FailEnqueue,
    /// Enqueue succeeds and no report ever arrives.
    Silent,
}

pub struct MemoryPublisher {
    tx: mpsc::UnboundedSender<DeliveryReport>,
    rx: Mutex<Option<DeliveryReportReceiver>>,
    behavior: Mutex<PublisherBehavior>,
    sent: Mutex<Vec<(RegistrationEvent, String)>>,
}

impl MemoryPublisher {
    pub fn new(behavior: PublisherBehavior) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            behavior: Mutex::new(behavior),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Pushes an arbitrary report, e.g. a transport-level broker error.
    pub fn emit(&self, report: DeliveryReport) {
        let _ = self.tx.send(report);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_topic(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, t)| t.clone())
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn send(
        &self,
        event: &RegistrationEvent,
        topic: &str,
        key: UserId,
    ) -> Result<(), PublishError> {
        let behavior = *self.behavior.lock().unwrap();
        if behavior == PublisherBehavior::FailEnqueue {
            return Err(PublishError::Enqueue("producer queue full".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((event.clone(), topic.to_string()));
        match behavior {
            PublisherBehavior::AckDelivered => {
                let _ = self.tx.send(DeliveryReport::Delivered { user_id: key });
            }
            PublisherBehavior::AckFailed => {
                let _ = self.tx.send(DeliveryReport::Failed {
                    user_id: key,
                    error: PublishError::Delivery("partition unavailable".to_string()),
                });
            }
            PublisherBehavior::FailEnqueue | PublisherBehavior::Silent => {}
        }
        Ok(())
    }

    fn take_delivery_reports(&self) -> Option<DeliveryReportReceiver> {
        self.rx.lock().unwrap().take()
    }
}
