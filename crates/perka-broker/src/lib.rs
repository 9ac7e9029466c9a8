//! Event publisher contract for perka.
//!
//! The broker itself lives outside this codebase; this crate defines the
//! capability the auth service is handed:
//! - `EventPublisher::send` enqueues a message and reports only local
//!   enqueue failures
//! - the actual delivery outcome arrives later as a `DeliveryReport` on the
//!   mpsc channel obtained from `take_delivery_reports`, correlated by the
//!   user id the message was keyed with
//!
//! This decoupling is what lets registration finish without ever waiting on
//! broker delivery.

mod error;
mod payload;
mod publisher;

pub use error::PublishError;
pub use payload::{RegistrationEvent, REGISTRATION_TOPIC};
pub use publisher::{DeliveryReport, DeliveryReportReceiver, EventPublisher};
