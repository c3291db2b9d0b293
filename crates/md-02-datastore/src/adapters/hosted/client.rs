//! HTTP plumbing shared by the hosted auth and row adapters.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared_types::{BackendError, BackendResult};
use std::time::Duration;
use tracing::{debug, warn};

use super::config::HostedConfig;

/// `Accept` value that makes the row API answer with a single object and
/// 406 when zero or several rows match.
pub(crate) const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Client for a hosted auth + row-store project.
///
/// Constructed explicitly and shared through `Arc`; there is no global
/// instance.
///
/// # Example
///
/// ```rust,no_run
/// use md_02_datastore::{HostedBackend, HostedConfig};
///
/// let backend = HostedBackend::new(
///     HostedConfig::new("https://abc.supabase.co", "public-anon-key")
///         .with_service_role_key("service-role-key"),
/// )?;
/// # Ok::<(), shared_types::BackendError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HostedBackend {
    pub(crate) config: HostedConfig,
    pub(crate) client: Client,
}

impl HostedBackend {
    pub fn new(config: HostedConfig) -> BackendResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&config.anon_key)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HostedConfig {
        &self.config
    }

    pub(crate) fn auth_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/auth/v1/{}", self.config.base(), path);
        debug!(method = %method, path, "hosted auth request");
        self.client.request(method, url)
    }

    /// Row requests run with the service-role key when one is configured, so
    /// the gateway acts as a trusted server after authenticating the caller.
    pub(crate) fn rest_request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.config.base(), table);
        let key = self.row_key();
        debug!(method = %method, table, "hosted row request");
        self.client
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key)
    }

    pub(crate) fn row_key(&self) -> &str {
        self.config
            .service_role_key
            .as_deref()
            .unwrap_or(&self.config.anon_key)
    }

    /// Send and split off non-success statuses with the provider's detail.
    pub(crate) async fn send_checked(&self, request: RequestBuilder) -> Result<Response, Failure> {
        let response = request.send().await.map_err(|e| Failure::Transport(transport_error(e)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = ProviderError::parse(&body);
        warn!(status = status.as_u16(), code = ?detail.code, "hosted backend returned an error");
        Err(Failure::Status { status, detail })
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        self.send_checked(request).await.map_err(BackendError::from)
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> BackendResult<T> {
        let response = self.send(request).await?;
        read_json(response).await
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| BackendError::Internal(format!("undecodable backend response: {}", e)))
}

pub(crate) fn header_value(raw: &str) -> BackendResult<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|_| BackendError::Invalid("key is not a valid header value".into()))
}

pub(crate) fn single_object(request: RequestBuilder) -> RequestBuilder {
    request.header(header::ACCEPT, SINGLE_OBJECT)
}

pub(crate) fn return_representation(request: RequestBuilder) -> RequestBuilder {
    request.header("Prefer", "return=representation")
}

/// A failed hosted call before it is folded into [`BackendError`].
#[derive(Debug)]
pub(crate) enum Failure {
    Transport(BackendError),
    Status {
        status: StatusCode,
        detail: ProviderError,
    },
}

impl From<Failure> for BackendError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Transport(err) => err,
            Failure::Status { status, detail } => classify(status, detail.message),
        }
    }
}

/// Error body as returned by the auth and row APIs, which disagree on field
/// names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProviderError {
    pub message: String,
    pub code: Option<String>,
}

impl ProviderError {
    pub(crate) fn parse(body: &str) -> Self {
        #[derive(Deserialize, Default)]
        struct Body {
            message: Option<String>,
            msg: Option<String>,
            error_description: Option<String>,
            error: Option<String>,
            error_code: Option<String>,
            code: Option<Value>,
        }

        let Ok(parsed) = serde_json::from_str::<Body>(body) else {
            return Self {
                message: truncate(body.trim(), 200),
                code: None,
            };
        };

        let code = parsed.error_code.or_else(|| match parsed.code {
            Some(Value::String(s)) => Some(s),
            _ => None,
        });
        let message = parsed
            .message
            .or(parsed.msg)
            .or(parsed.error_description)
            .or(parsed.error)
            .unwrap_or_default();

        Self { message, code }
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Map an HTTP status onto the backend error taxonomy.
pub fn classify(status: StatusCode, message: String) -> BackendError {
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("error").to_string()
    } else {
        message
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
        StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => BackendError::NotFound(message),
        StatusCode::CONFLICT => BackendError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => BackendError::Invalid(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            BackendError::Unavailable(message)
        }
        s if s.is_server_error() => BackendError::Unavailable(message),
        _ => BackendError::Internal(format!("unexpected status {}: {}", status.as_u16(), message)),
    }
}

pub(crate) fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_decode() {
        BackendError::Internal(format!("undecodable backend response: {}", e))
    } else {
        BackendError::Unavailable(format!("hosted backend unreachable: {}", e))
    }
}
