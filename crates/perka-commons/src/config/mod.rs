//! Service configuration, loaded from TOML.
//!
//! Every setting has a usable default so a config file only needs to name
//! what it overrides. The one exception is `auth.service_secret`, which has
//! a deliberately unusable default that `validate()` rejects.

mod defaults;
mod types;

pub use types::{
    AuthSettings, BrokerSettings, HandlerTimeouts, LedgerSettings, ServiceConfig,
};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
