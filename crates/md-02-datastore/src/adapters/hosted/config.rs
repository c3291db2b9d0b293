//! Connection settings for the hosted backend.

use serde::{Deserialize, Serialize};
use shared_types::{BackendError, BackendResult};

/// Where the hosted project lives and which keys to present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub base_url: String,
    /// Public (anon) key, sent as `apikey` on every request
    pub anon_key: String,
    /// Service-role key for row access and account administration
    pub service_role_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            anon_key: String::new(),
            service_role_key: None,
            timeout_secs: 15,
        }
    }
}

impl HostedConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            ..Self::default()
        }
    }

    pub fn with_service_role_key(mut self, key: impl Into<String>) -> Self {
        self.service_role_key = Some(key.into());
        self
    }

    pub fn validate(&self) -> BackendResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(BackendError::Invalid(format!(
                "hosted base url must be http(s): {}",
                self.base_url
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(BackendError::Invalid("hosted anon key is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(BackendError::Invalid("hosted timeout cannot be 0".into()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub(crate) fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
