//! AWS Signature Version 4, query-string flavour.
//!
//! Only what a presigned single-object request needs: the payload is
//! `UNSIGNED-PAYLOAD` and `host` is the only signed header, so the client
//! may attach any `Content-Type` when it uses the URL.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Lifetime used when none is configured.
pub const DEFAULT_EXPIRY_SECS: u64 = 3600;

/// Longest lifetime SigV4 allows (seven days).
pub const MAX_EXPIRY_SECS: u64 = 604_800;

/// Access key pair, optionally with a session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// What to presign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    /// `GET`, `PUT`, ...
    pub method: String,
    /// `http` or `https`
    pub scheme: String,
    /// Host header value, including a non-default port
    pub host: String,
    /// Unencoded absolute path, e.g. `/uploads/a b.png`
    pub path: String,
    pub region: String,
    pub service: String,
    pub expires_secs: u64,
}

/// Build a presigned URL valid for `expires_secs` from `now`.
pub fn presign(
    request: &PresignRequest,
    credentials: &Credentials,
    now: DateTime<Utc>,
) -> StorageResult<String> {
    if request.expires_secs == 0 || request.expires_secs > MAX_EXPIRY_SECS {
        return Err(StorageError::InvalidExpiry {
            secs: request.expires_secs,
            max: MAX_EXPIRY_SECS,
        });
    }
    if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
        return Err(StorageError::Config("missing access key".into()));
    }

    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let scope = format!(
        "{}/{}/{}/aws4_request",
        date, request.region, request.service
    );

    let mut params = vec![
        ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
        (
            "X-Amz-Credential".to_string(),
            format!("{}/{}", credentials.access_key_id, scope),
        ),
        ("X-Amz-Date".to_string(), amz_date.clone()),
        ("X-Amz-Expires".to_string(), request.expires_secs.to_string()),
        ("X-Amz-SignedHeaders".to_string(), "host".to_string()),
    ];
    if let Some(token) = &credentials.session_token {
        params.push(("X-Amz-Security-Token".to_string(), token.clone()));
    }
    let query = canonical_query(&params);
    let uri = canonical_uri(&request.path);

    let canonical_request = format!(
        "{}\n{}\n{}\nhost:{}\n\nhost\n{}",
        request.method, uri, query, request.host, UNSIGNED_PAYLOAD
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = signing_key(
        &credentials.secret_access_key,
        &date,
        &request.region,
        &request.service,
    )?;
    let signature = hex::encode(hmac(&key, &string_to_sign)?);

    Ok(format!(
        "{}://{}{}?{}&X-Amz-Signature={}",
        request.scheme, request.host, uri, query, signature
    ))
}

/// Each path segment percent-encoded, slashes kept.
pub fn canonical_uri(path: &str) -> String {
    let encoded: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

fn canonical_query(params: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(k).into_owned(),
                urlencoding::encode(v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> StorageResult<Vec<u8>> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date)?;
    let k_region = hmac(&k_date, region)?;
    let k_service = hmac(&k_region, service)?;
    hmac(&k_service, "aws4_request")
}

fn hmac(key: &[u8], data: &str) -> StorageResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StorageError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
