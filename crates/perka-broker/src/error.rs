/// Errors produced by an event publisher.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    /// The message could not be serialized for the wire.
    #[error("failed to serialize event: {0}")]
    Serialization(String),

    /// The local producer queue rejected the message.
    #[error("failed to enqueue event: {0}")]
    Enqueue(String),

    /// The broker rejected the message after the producer's own retries.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Client-instance-level broker failure (connection, auth). Not tied to
    /// any single message.
    #[error("broker failed: {0}")]
    Broker(String),
}
