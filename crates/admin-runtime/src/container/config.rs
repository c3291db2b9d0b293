//! # Runtime Configuration
//!
//! Everything the executable needs, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `MD_ENVIRONMENT` | `local` | `production` turns on strict validation |
//! | `MD_BACKEND` | `hosted` | `hosted` or `memory` |
//! | `MD_HOSTED_URL` | `http://127.0.0.1:54321` | hosted project URL |
//! | `MD_HOSTED_ANON_KEY` | | public key |
//! | `MD_HOSTED_SERVICE_ROLE_KEY` | | row access and account deletion |
//! | `MD_HOSTED_TIMEOUT_SECS` | `15` | per-request timeout |
//! | `MD_STORAGE` | `s3` if `S3_BUCKET_NAME` is set, else `memory` | `s3` or `memory` |
//! | `S3_BUCKET_NAME`, `AWS_REGION` | `us-east-1` region | bucket |
//! | `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN` | | credentials |
//! | `MD_S3_ENDPOINT` | | S3-compatible endpoint, path-style |
//! | `MD_PRESIGN_EXPIRY_SECS` | `3600` | presigned URL lifetime |
//! | `MD_HTTP_HOST`, `MD_HTTP_PORT` | `127.0.0.1`, `8080` | listen address |
//! | `MD_CORS_ORIGINS` | `*` | comma-separated origins |
//! | `MD_MAX_BODY_BYTES`, `MD_MAX_IMAGE_BYTES` | 10 MiB, 5 MiB | size limits |
//! | `MD_REQUEST_TIMEOUT_SECS` | `30` | whole-request timeout |

use md_02_datastore::HostedConfig;
use md_03_object_storage::S3Config;
use md_04_admin_gateway::GatewayConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which datastore adapter to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Hosted,
    Memory,
}

/// Which object storage adapter to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    S3,
    Memory,
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Deployment name; `production` is validated strictly.
    pub environment: String,
    pub backend: BackendKind,
    pub hosted: HostedConfig,
    pub storage: StorageKind,
    pub s3: S3Config,
    /// Base of the URLs handed out by the in-memory object store.
    pub memory_object_base_url: String,
    pub gateway: GatewayConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            backend: BackendKind::Hosted,
            hosted: HostedConfig::default(),
            storage: StorageKind::Memory,
            s3: S3Config::default(),
            memory_object_base_url: "memory://objects".to_string(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("{name} has an invalid value: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    /// A value required by the selected adapters is missing.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// The combination of settings is not allowed.
    #[error("{0}")]
    Invalid(String),
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(environment) = get("MD_ENVIRONMENT") {
            config.environment = environment.trim().to_lowercase();
        }

        config.backend = match get("MD_BACKEND").as_deref().map(str::trim) {
            None | Some("hosted") => BackendKind::Hosted,
            Some("memory") => BackendKind::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    name: "MD_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        if let Some(url) = get("MD_HOSTED_URL") {
            config.hosted.base_url = url;
        }
        if let Some(key) = get("MD_HOSTED_ANON_KEY") {
            config.hosted.anon_key = key;
        }
        config.hosted.service_role_key = get("MD_HOSTED_SERVICE_ROLE_KEY");
        if let Some(secs) = parsed(&get, "MD_HOSTED_TIMEOUT_SECS")? {
            config.hosted.timeout_secs = secs;
        }

        if let Some(bucket) = get("S3_BUCKET_NAME") {
            config.s3.bucket = bucket;
            config.storage = StorageKind::S3;
        }
        config.storage = match get("MD_STORAGE").as_deref().map(str::trim) {
            None => config.storage,
            Some("s3") => StorageKind::S3,
            Some("memory") => StorageKind::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    name: "MD_STORAGE",
                    value: other.to_string(),
                })
            }
        };
        if let Some(region) = get("AWS_REGION") {
            config.s3.region = region;
        }
        if let Some(key) = get("AWS_ACCESS_KEY_ID") {
            config.s3.access_key_id = key;
        }
        if let Some(secret) = get("AWS_SECRET_ACCESS_KEY") {
            config.s3.secret_access_key = secret;
        }
        config.s3.session_token = get("AWS_SESSION_TOKEN");
        config.s3.endpoint = get("MD_S3_ENDPOINT");
        if let Some(secs) = parsed(&get, "MD_PRESIGN_EXPIRY_SECS")? {
            config.s3.presign_expiry_secs = secs;
        }

        if let Some(host) = parsed(&get, "MD_HTTP_HOST")? {
            config.gateway.http.host = host;
        }
        if let Some(port) = parsed(&get, "MD_HTTP_PORT")? {
            config.gateway.http.port = port;
        }
        if let Some(origins) = get("MD_CORS_ORIGINS") {
            config.gateway.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(bytes) = parsed(&get, "MD_MAX_BODY_BYTES")? {
            config.gateway.limits.max_body_bytes = bytes;
        }
        if let Some(bytes) = parsed(&get, "MD_MAX_IMAGE_BYTES")? {
            config.gateway.limits.max_image_bytes = bytes;
        }
        if let Some(secs) = parsed::<u64>(&get, "MD_REQUEST_TIMEOUT_SECS")? {
            config.gateway.timeouts.request = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Checks that apply everywhere: the selected adapters must be usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.backend == BackendKind::Hosted {
            self.hosted
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if self.storage == StorageKind::S3 {
            self.s3
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    /// Validate configuration for production readiness.
    ///
    /// On top of [`validate`](Self::validate), rejects in-process adapters
    /// and a hosted backend without its service-role key, which account
    /// deletion needs.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.backend == BackendKind::Memory {
            return Err(ConfigError::Invalid(
                "MD_BACKEND=memory is not allowed in production".into(),
            ));
        }
        if self.storage == StorageKind::Memory {
            return Err(ConfigError::Missing("S3_BUCKET_NAME"));
        }
        if self.hosted.service_role_key.is_none() {
            return Err(ConfigError::Missing("MD_HOSTED_SERVICE_ROLE_KEY"));
        }
        Ok(())
    }
}

fn parsed<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
    }
}
