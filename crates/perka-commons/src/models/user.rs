//! User account model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Delivery status of the registration event published for a user.
///
/// A freshly registered user starts as `Pending`; the publisher's delivery
/// report later moves the status to `Successful` or `Failed`. The stored
/// string forms are "pending" / "successful" / "failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Successful,
    Failed,
}

impl MessageStatus {
    /// Stored string form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Successful => "successful",
            MessageStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user as held by the user directory.
///
/// `pass_hash` is a bcrypt hash string (salt included). Users are never
/// deleted; `message_status` is the only field mutated after creation, by
/// the publisher-ack consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub pass_hash: String,
    pub is_admin: bool,
    pub message_status: MessageStatus,
}
