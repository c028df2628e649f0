//! Client configuration.
//!
//! Defaults point at the public chimu API. `from_env` lets a host override
//! the endpoint (for a mirror or a local mock) without code changes.

use std::time::Duration;

use crate::error::{ChimuError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.chimu.moe/v1";

pub const DEFAULT_USER_AGENT: &str = concat!("chimu-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applies to the whole exchange. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Read `CHIMU_API_URL` and `CHIMU_TIMEOUT_SECS`, falling back to the
    /// defaults for whichever is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("CHIMU_API_URL") {
            config.base_url = url;
        }

        if let Some(secs) = lookup("CHIMU_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ChimuError::ConfigError(format!("CHIMU_TIMEOUT_SECS: {e}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
