//! A gateway router over in-memory backends, driven with
//! `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use md_02_datastore::{BackendPorts, InMemoryBackend};
use md_03_object_storage::InMemoryObjectStorage;
use md_04_admin_gateway::{AdminGatewayService, GatewayConfig};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct Harness {
    pub router: Router,
    pub backend: Arc<InMemoryBackend>,
    pub storage: Arc<InMemoryObjectStorage>,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let storage = Arc::new(InMemoryObjectStorage::default());
        let gateway = AdminGatewayService::new(
            config,
            BackendPorts::from_memory(Arc::clone(&backend)),
            storage.clone(),
        )
        .expect("valid gateway config");
        Self {
            router: gateway.router(),
            backend,
            storage,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("valid request")).await
    }

    /// Sign up and log in; returns `(user_id, access_token)`.
    pub async fn register(&self, email: &str) -> (String, String) {
        let signup = self
            .call(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": "secret1",
                    "confirmPassword": "secret1",
                })),
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{}", signup.body);

        let login = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": "secret1" })),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);

        let user_id = signup.body["user"]["id"].as_str().unwrap_or_default().to_string();
        let token = login.body["access_token"].as_str().unwrap_or_default().to_string();
        (user_id, token)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
