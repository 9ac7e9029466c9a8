//! Shared types and configuration for the perka services.
//!
//! This crate holds the pieces every other perka crate needs:
//! - type-safe identifiers (`UserId`)
//! - the `User` account model and its async message-delivery status
//! - TOML-backed service configuration

pub mod config;
pub mod models;

pub use config::{ConfigError, ServiceConfig};
pub use models::{MessageStatus, User, UserId, UserIdParseError};
