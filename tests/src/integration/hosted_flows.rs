//! # Hosted Backend Flows
//!
//! The gateway wired to the hosted adapter, with the provider mocked by
//! wiremock. Covers token verification and the delete-then-insert todo
//! replacement, including an insert that fails after the delete.

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use axum::Router;
    use md_02_datastore::{BackendPorts, HostedConfig};
    use md_03_object_storage::InMemoryObjectStorage;
    use md_04_admin_gateway::{AdminGatewayService, GatewayConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::integration::harness::Harness;

    const TOKEN: &str = "user-token";

    fn tree() -> Value {
        json!([{ "name": "Todo", "items": [ { "name": "Inbox" }, { "name": "Later" } ] }])
    }

    fn todo_row(id: i64, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "description": null,
            "is_completed": false,
            "user_id": "u-1",
            "first_menu": "Todo",
            "second_menu": title,
            "created_at": "2024-03-01T10:00:00+00:00",
            "updated_at": null
        })
    }

    /// A harness whose router talks to `server`; the in-memory parts stay idle.
    fn harness(server: &MockServer) -> Harness {
        harness_with(server, GatewayConfig::default())
    }

    fn harness_with(server: &MockServer, config: GatewayConfig) -> Harness {
        let ports = BackendPorts::from_hosted(
            HostedConfig::new(server.uri(), "anon-key").with_service_role_key("service-key"),
        )
        .unwrap();
        let gateway = AdminGatewayService::new(
            config,
            ports,
            Arc::new(InMemoryObjectStorage::default()),
        )
        .unwrap();
        let router: Router = gateway.router();
        Harness {
            router,
            ..Harness::new()
        }
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "email": "ada@example.com"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_seed_deletes_then_inserts() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/todos"))
            .and(query_param("user_id", "eq.u-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                todo_row(1, "Old")
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/todos"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                todo_row(2, "Inbox"),
                todo_row(3, "Later")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let harness = harness(&server);
        let reply = harness
            .call(
                Method::POST,
                "/api/todos/seed",
                Some(TOKEN),
                Some(json!({ "menu_structure": tree() })),
            )
            .await;

        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        assert_eq!(reply.body, json!({ "user_id": "u-1", "removed": 1, "inserted": 2 }));
    }

    #[tokio::test]
    async fn test_failed_insert_reports_partial_replace() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                todo_row(1, "Old"),
                todo_row(2, "Older")
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/todos"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({ "message": "try later" })),
            )
            .mount(&server)
            .await;

        let harness = harness(&server);
        let reply = harness
            .call(
                Method::POST,
                "/api/todos/seed",
                Some(TOKEN),
                Some(json!({ "menu_structure": tree() })),
            )
            .await;

        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
        assert_eq!(reply.body["error"]["code"], "partial_replace");
        assert_eq!(reply.body["error"]["data"]["removed"], 2);
    }

    #[tokio::test]
    async fn test_malformed_tree_never_reaches_provider() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let harness = harness(&server);
        let reply = harness
            .call(
                Method::POST,
                "/api/todos/seed",
                Some(TOKEN),
                Some(json!({ "menu_structure": [ { "items": [] } ] })),
            )
            .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"]["code"], "malformed_menu_tree");
    }

    #[tokio::test]
    async fn test_provider_outage_during_auth_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "down" })))
            .mount(&server)
            .await;

        let harness = harness(&server);
        let reply = harness.call(Method::GET, "/api/menus", Some(TOKEN), None).await;

        assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(reply.body["error"]["code"], "unavailable");
    }

    #[tokio::test]
    async fn test_rejected_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "msg": "invalid JWT" })),
            )
            .mount(&server)
            .await;

        let harness = harness(&server);
        let reply = harness.call(Method::GET, "/api/todos", Some(TOKEN), None).await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_slow_provider_hits_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "u-1" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut config = GatewayConfig::default();
        config.timeouts.request = Duration::from_millis(50);
        let reply = harness_with(&server, config)
            .call(Method::GET, "/api/menus", Some(TOKEN), None)
            .await;

        assert_eq!(reply.status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(reply.body["error"]["code"], "request_timeout");
    }
}
