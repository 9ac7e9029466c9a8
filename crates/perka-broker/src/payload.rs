//! Event payloads published by perka services.

use perka_commons::UserId;
use serde::{Deserialize, Serialize};

/// Topic the registration event is published to by default.
pub const REGISTRATION_TOPIC: &str = "registration";

/// Event published when a user registers.
///
/// Keyed by the new user's id so downstream consumers (and the delivery
/// report) can correlate it back to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub user_id: UserId,
    pub email: String,
    /// Display name supplied at registration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}
