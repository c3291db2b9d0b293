//! HTTP client over the admin gateway routes.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur when talking to the gateway.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The gateway answered with its error envelope.
    #[error("{status} [{code}]: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
        data: Option<Value>,
    },
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Upload rejected by object store: {0}")]
    Upload(StatusCode),
}

/// Gateway client. Every call except `login` and `health` sends the bearer
/// token when one is configured.
pub struct GatewayClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connection(format!("Cannot connect to {}", self.base_url))
            } else {
                ClientError::Http(e)
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))?
        };

        if status.is_success() {
            return Ok(value);
        }
        let error = &value["error"];
        Err(ClientError::Api {
            status,
            code: error["code"].as_str().unwrap_or("unknown").to_string(),
            message: error["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string()),
            data: error.get("data").cloned(),
        })
    }

    async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.call(Method::GET, path, &[], None).await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get("/health").await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        self.call(
            Method::POST,
            "/api/auth/login",
            &[],
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn me(&self) -> Result<Value, ClientError> {
        self.get("/api/auth/me").await
    }

    // ---- menus -------------------------------------------------------------

    pub async fn list_menus(&self) -> Result<Value, ClientError> {
        self.get("/api/menus").await
    }

    pub async fn get_menu(&self, id: i64) -> Result<Value, ClientError> {
        self.get(&format!("/api/menus/{}", id)).await
    }

    /// `body` is `{title?, description?, classification?, menu_structure}`.
    pub async fn create_menu(&self, body: Value) -> Result<Value, ClientError> {
        self.call(Method::POST, "/api/menus", &[], Some(body)).await
    }

    pub async fn update_menu(&self, id: i64, body: Value) -> Result<Value, ClientError> {
        self.call(Method::PUT, &format!("/api/menus/{}", id), &[], Some(body))
            .await
    }

    pub async fn delete_menu(&self, id: i64) -> Result<(), ClientError> {
        self.call(Method::DELETE, &format!("/api/menus/{}", id), &[], None)
            .await
            .map(|_| ())
    }

    pub async fn flatten(&self, tree: Value) -> Result<Value, ClientError> {
        self.call(
            Method::POST,
            "/api/menus/flatten",
            &[],
            Some(json!({ "menu_structure": tree })),
        )
        .await
    }

    pub async fn breadcrumbs(&self, id: i64, route: &str) -> Result<Value, ClientError> {
        self.call(
            Method::GET,
            &format!("/api/menus/{}/breadcrumbs", id),
            &[("route", route.to_string())],
            None,
        )
        .await
    }

    // ---- todos -------------------------------------------------------------

    pub async fn list_todos(&self) -> Result<Value, ClientError> {
        self.get("/api/todos").await
    }

    pub async fn list_todos_grouped(&self) -> Result<Value, ClientError> {
        self.get("/api/todos/grouped").await
    }

    pub async fn seed_from_menu(&self, id: i64) -> Result<Value, ClientError> {
        self.call(Method::POST, &format!("/api/menus/{}/seed-todos", id), &[], None)
            .await
    }

    pub async fn seed_from_tree(&self, tree: Value) -> Result<Value, ClientError> {
        self.call(
            Method::POST,
            "/api/todos/seed",
            &[],
            Some(json!({ "menu_structure": tree })),
        )
        .await
    }

    pub async fn set_completion(&self, id: i64, is_completed: bool) -> Result<Value, ClientError> {
        self.call(
            Method::PATCH,
            &format!("/api/todos/{}/completion", id),
            &[],
            Some(json!({ "is_completed": is_completed })),
        )
        .await
    }

    /// One id uses the single-row route, several use bulk delete.
    pub async fn delete_todos(&self, ids: &[i64]) -> Result<Value, ClientError> {
        match ids {
            [id] => {
                self.call(Method::DELETE, &format!("/api/todos/{}", id), &[], None)
                    .await?;
                Ok(json!({ "deleted": 1 }))
            }
            _ => {
                self.call(
                    Method::POST,
                    "/api/todos/bulk-delete",
                    &[],
                    Some(json!({ "ids": ids })),
                )
                .await
            }
        }
    }

    // ---- users -------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Value, ClientError> {
        self.get("/api/users").await
    }

    pub async fn update_profile(&self, user_id: &str, update: Value) -> Result<Value, ClientError> {
        self.call(
            Method::PUT,
            &format!("/api/users/{}/profile", user_id),
            &[],
            Some(update),
        )
        .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<Value, ClientError> {
        self.call(Method::DELETE, &format!("/api/users/{}", user_id), &[], None)
            .await
    }

    // ---- uploads -----------------------------------------------------------

    /// Presign through the gateway, then `PUT` the bytes straight to the
    /// object store. Returns the presign response.
    pub async fn upload(
        &self,
        file_name: &str,
        folder: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Value, ClientError> {
        let mut query = vec![("file", file_name.to_string())];
        if let Some(folder) = folder {
            query.push(("folder", folder.to_string()));
        }
        let presigned = self
            .call(Method::GET, "/api/uploads/presign", &query, None)
            .await?;
        let url = presigned["url"]
            .as_str()
            .ok_or_else(|| ClientError::Parse("presign response has no url".into()))?;

        let response = self.client.put(url).body(bytes).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Upload(response.status()));
        }
        Ok(presigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = GatewayClient::new("http://127.0.0.1:8080/", None).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: StatusCode::BAD_REQUEST,
            code: "malformed_menu_tree".into(),
            message: "node at [0] has no name".into(),
            data: None,
        };
        assert_eq!(
            err.to_string(),
            "400 Bad Request [malformed_menu_tree]: node at [0] has no name"
        );
    }
}
