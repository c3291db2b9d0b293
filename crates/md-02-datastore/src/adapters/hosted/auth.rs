//! [`AuthProvider`] over the hosted `/auth/v1` API.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use shared_types::{AuthUser, BackendError, BackendResult, Session, UserId};
use tracing::info;

use super::client::{read_json, Failure, HostedBackend};
use crate::ports::AuthProvider;

/// Provider codes for an email that is already registered.
const DUPLICATE_ACCOUNT_CODES: &[&str] = &["user_already_exists", "email_exists"];

#[async_trait]
impl AuthProvider for HostedBackend {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let request = self
            .auth_request(Method::POST, "signup")
            .json(&json!({ "email": email, "password": password }));

        let response = match self.send_checked(request).await {
            Ok(response) => response,
            Err(Failure::Status { detail, .. })
                if detail
                    .code
                    .as_deref()
                    .is_some_and(|code| DUPLICATE_ACCOUNT_CODES.contains(&code)) =>
            {
                return Err(BackendError::Conflict(detail.message));
            }
            Err(failure) => return Err(failure.into()),
        };

        // With email confirmation off the provider answers with a session
        // wrapping the user; with it on, with the bare user.
        let body: Value = read_json(response).await?;
        let user = match body.get("user") {
            Some(user) if user.is_object() => user.clone(),
            _ => body,
        };
        let user: AuthUser = decode(user)?;
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let request = self
            .auth_request(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        match self.send_checked(request).await {
            Ok(response) => read_json(response).await,
            // Wrong credentials come back as 400 `invalid_grant`.
            Err(Failure::Status { status, detail }) if status == StatusCode::BAD_REQUEST => {
                Err(BackendError::Unauthorized(if detail.message.is_empty() {
                    "invalid login credentials".to_string()
                } else {
                    detail.message
                }))
            }
            Err(failure) => Err(failure.into()),
        }
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let request = self
            .auth_request(Method::POST, "logout")
            .bearer_auth(access_token);
        self.send(request).await?;
        Ok(())
    }

    async fn user_for_token(&self, access_token: &str) -> BackendResult<AuthUser> {
        let request = self.auth_request(Method::GET, "user").bearer_auth(access_token);
        match self.send_json::<Value>(request).await {
            Ok(user) => decode(user),
            // A token whose account is gone is as good as no token.
            Err(BackendError::NotFound(message)) => Err(BackendError::Unauthorized(message)),
            Err(err) => Err(err),
        }
    }

    async fn admin_delete_user(&self, user_id: &UserId) -> BackendResult<()> {
        let Some(service_key) = self.config.service_role_key.as_deref() else {
            return Err(BackendError::Unauthorized(
                "account deletion requires a service role key".into(),
            ));
        };
        let request = self
            .auth_request(Method::DELETE, &format!("admin/users/{}", user_id))
            .header("apikey", service_key)
            .bearer_auth(service_key);
        self.send(request).await?;
        info!(user_id = %user_id, "account deleted");
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> BackendResult<T> {
    serde_json::from_value(value)
        .map_err(|e| BackendError::Internal(format!("undecodable auth response: {}", e)))
}
