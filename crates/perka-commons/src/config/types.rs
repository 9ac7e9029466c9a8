use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use super::ConfigError;

/// Main service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub timeouts: HandlerTimeouts,
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub broker: BrokerSettings,
}

/// Token-authority settings: signing secret, token lifetimes, hash cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Shared HS256 signing secret for all perka tokens.
    #[serde(default = "default_service_secret")]
    pub service_secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: u64,

    /// Bcrypt cost factor for password hashing.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

/// Per-operation time budgets, in milliseconds.
///
/// Each auth operation runs under its own budget; an elapsed budget cancels
/// the in-flight downstream calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerTimeouts {
    #[serde(default = "default_login_timeout_ms")]
    pub login_timeout_ms: u64,
    #[serde(default = "default_logout_timeout_ms")]
    pub logout_timeout_ms: u64,
    #[serde(default = "default_register_timeout_ms")]
    pub register_timeout_ms: u64,
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,
}

/// Ledger database settings.
///
/// Reads go to the replica when one is configured, writes always to the
/// master (the transactional `add_loyalty` path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    #[serde(default = "default_ledger_master_dsn")]
    pub master_dsn: String,

    /// Optional read replica; falls back to the master when absent.
    #[serde(default)]
    pub replica_dsn: Option<String>,

    #[serde(default = "default_ledger_max_connections")]
    pub max_connections: u32,
}

/// Event publisher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSettings {
    /// Topic the registration event is published to.
    #[serde(default = "default_registration_topic")]
    pub registration_topic: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            service_secret: default_service_secret(),
            access_token_ttl_secs: default_access_token_ttl_secs(),
            refresh_token_ttl_secs: default_refresh_token_ttl_secs(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl Default for HandlerTimeouts {
    fn default() -> Self {
        Self {
            login_timeout_ms: default_login_timeout_ms(),
            logout_timeout_ms: default_logout_timeout_ms(),
            register_timeout_ms: default_register_timeout_ms(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            master_dsn: default_ledger_master_dsn(),
            replica_dsn: None,
            max_connections: default_ledger_max_connections(),
        }
    }
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            registration_topic: default_registration_topic(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            auth: AuthSettings::default(),
            timeouts: HandlerTimeouts::default(),
            ledger: LedgerSettings::default(),
            broker: BrokerSettings::default(),
        }
    }
}

impl AuthSettings {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }
}

impl HandlerTimeouts {
    pub fn login(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    pub fn logout(&self) -> Duration {
        Duration::from_millis(self.logout_timeout_ms)
    }

    pub fn register(&self) -> Duration {
        Duration::from_millis(self.register_timeout_ms)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }
}

impl ServiceConfig {
    /// Parses configuration from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: ServiceConfig = toml::from_str(raw)?;
        Ok(cfg)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Rejects configurations that cannot be run safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.service_secret == default_service_secret() {
            return Err(ConfigError::Invalid(
                "auth.service_secret is the development default; set a real secret".to_string(),
            ));
        }
        if self.auth.service_secret.len() < 32 {
            return Err(ConfigError::Invalid(
                "auth.service_secret must be at least 32 characters".to_string(),
            ));
        }
        if self.auth.access_token_ttl_secs == 0 || self.auth.refresh_token_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "token lifetimes must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
