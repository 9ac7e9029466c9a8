//! The publisher capability and its delivery-report channel.

use async_trait::async_trait;
use perka_commons::UserId;
use tokio::sync::mpsc;

use crate::{PublishError, RegistrationEvent};

/// Outcome of an asynchronous publish, delivered on the report channel.
///
/// Per-message outcomes carry the user id the message was keyed with;
/// `BrokerError` is an instance-level transport failure with no message (and
/// so no user) attached.
#[derive(Debug, Clone)]
pub enum DeliveryReport {
    /// The broker acknowledged the message.
    Delivered { user_id: UserId },
    /// The broker rejected this message after the producer's retries.
    Failed {
        user_id: UserId,
        error: PublishError,
    },
    /// Transport-level failure not correlated to any message.
    BrokerError { error: PublishError },
}

/// Receiver half of the delivery-report channel.
pub type DeliveryReportReceiver = mpsc::UnboundedReceiver<DeliveryReport>;

/// Capability to publish registration events.
///
/// `send` only fails on local enqueue problems; whether the broker accepted
/// the message arrives later as a [`DeliveryReport`]. Implementations are
/// expected to keep producing reports for as long as the publisher lives and
/// to close the channel on shutdown.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Enqueues `event` for delivery to `topic`, keyed by `key`.
    async fn send(
        &self,
        event: &RegistrationEvent,
        topic: &str,
        key: UserId,
    ) -> Result<(), PublishError>;

    /// Hands over the delivery-report receiver.
    ///
    /// The channel has a single consumer (the auth service's drain task);
    /// subsequent calls return `None`.
    fn take_delivery_reports(&self) -> Option<DeliveryReportReceiver>;
}
