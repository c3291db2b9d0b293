//! Bearer-token authentication.
//!
//! Resolves `Authorization: Bearer <token>` through the [`AuthProvider`] and
//! stores the caller as an [`AuthenticatedUser`] request extension. Requests
//! without a usable token never reach the handler.

use axum::{body::Body, http::Request, response::IntoResponse, response::Response};
use md_02_datastore::AuthProvider;
use shared_types::{AuthUser, BackendError};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::domain::ApiError;

/// The caller behind the current request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: AuthUser,
    pub access_token: String,
}

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    provider: Arc<dyn AuthProvider>,
}

impl AuthLayer {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            provider: Arc::clone(&self.provider),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    provider: Arc<dyn AuthProvider>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let provider = Arc::clone(&self.provider);
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(token) = bearer_token(&req) else {
                debug!(path = %req.uri().path(), "request without bearer token");
                return Ok(ApiError::unauthorized("missing bearer token").into_response());
            };

            let user = match provider.user_for_token(&token).await {
                Ok(user) => user,
                Err(BackendError::Unauthorized(msg)) | Err(BackendError::NotFound(msg)) => {
                    debug!(reason = %msg, "bearer token rejected");
                    return Ok(ApiError::unauthorized("invalid or expired token").into_response());
                }
                Err(err) => {
                    warn!(error = %err, "could not verify bearer token");
                    return Ok(ApiError::from(err).into_response());
                }
            };

            debug!(user_id = %user.id, "request authenticated");
            req.extensions_mut().insert(AuthenticatedUser {
                user,
                access_token: token,
            });
            inner.call(req).await
        })
    }
}

/// Token from `Authorization: Bearer <token>`; the scheme is
/// case-insensitive and blank tokens count as missing.
pub fn bearer_token<B>(req: &Request<B>) -> Option<String> {
    let value = req.headers().get("authorization")?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
