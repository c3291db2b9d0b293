//! # Gateway Flows
//!
//! Drives the admin API end to end over the in-memory datastore and object
//! store:
//!
//! 1. **Auth**: sign-up validation, login, bearer checks, logout
//! 2. **Menus**: create, flatten preview, breadcrumbs, malformed trees
//! 3. **Todos**: seeding from a stored tree, grouping, completion, bulk delete
//! 4. **Users**: listing, profile updates, account removal
//! 5. **Uploads**: presigning and direct image uploads

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use md_03_object_storage::ObjectKey;
    use md_04_admin_gateway::{GatewayConfig, VERSION};
    use serde_json::{json, Value};

    use crate::integration::harness::Harness;

    fn sample_tree() -> Value {
        json!([
            {
                "key": "todo",
                "name": "Todo",
                "items": [
                    { "key": "dashboard", "name": "Dashboard", "items": [
                        { "key": "all-tasks", "name": "All tasks" },
                        { "key": "today", "name": "Today" }
                    ]},
                    { "key": "settings", "name": "Settings" }
                ]
            },
            { "key": "empty", "name": "Empty", "items": [] },
            {
                "key": "admin",
                "name": "Admin",
                "items": [ { "key": "users", "name": "Users" } ]
            }
        ])
    }

    async fn create_menu(harness: &Harness, token: &str, tree: Value) -> i64 {
        let reply = harness
            .call(
                Method::POST,
                "/api/menus",
                Some(token),
                Some(json!({ "title": "Main", "menu_structure": tree })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["id"].as_i64().expect("menu id")
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    #[tokio::test]
    async fn test_health_is_public() {
        let harness = Harness::new();
        let reply = harness.call(Method::GET, "/health", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["status"], "ok");
        assert_eq!(reply.body["version"], VERSION);
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_envelope() {
        let harness = Harness::new();
        let reply = harness.call(Method::GET, "/api/nothing-here", None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body["error"]["code"], "not_found");
        assert!(reply.body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("/api/nothing-here"));
    }

    #[tokio::test]
    async fn test_protected_route_requires_bearer() {
        let harness = Harness::new();
        let reply = harness.call(Method::GET, "/api/menus", None, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.headers[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(reply.body["error"]["code"], "unauthorized");

        let reply = harness
            .call(Method::GET, "/api/menus", Some("not-a-token"), None)
            .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_up_reports_every_invalid_field() {
        let harness = Harness::new();
        let reply = harness
            .call(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({ "email": "nope", "password": "123", "confirmPassword": "456" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"]["code"], "validation_failed");
        let fields: Vec<&str> = reply.body["error"]["data"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["email", "password", "confirmPassword"]);
    }

    #[tokio::test]
    async fn test_sign_up_creates_initial_profile() {
        let harness = Harness::new();
        let (user_id, token) = harness.register("ada@example.com").await;

        let me = harness.call(Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["id"], user_id.as_str());

        let users = harness.call(Method::GET, "/api/users", Some(&token), None).await;
        assert_eq!(users.status, StatusCode::OK);
        assert_eq!(users.body[0]["current_task"], "N/A");
        assert_eq!(users.body[0]["today_completed_tasks_count"], 0);
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_conflicts() {
        let harness = Harness::new();
        harness.register("ada@example.com").await;
        let reply = harness
            .call(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "email": "ADA@example.com",
                    "password": "secret1",
                    "confirmPassword": "secret1"
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let harness = Harness::new();
        harness.register("ada@example.com").await;
        let reply = harness
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "ada@example.com", "password": "wrong-one" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;

        let reply = harness
            .call(Method::POST, "/api/auth/logout", Some(&token), None)
            .await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);

        let reply = harness.call(Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    // =========================================================================
    // MENUS
    // =========================================================================

    #[tokio::test]
    async fn test_flatten_preview_groups_by_top_level() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;

        let reply = harness
            .call(
                Method::POST,
                "/api/menus/flatten",
                Some(&token),
                Some(json!({ "menu_structure": sample_tree() })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        assert_eq!(
            reply.body["pairs"],
            json!([
                { "first_menu": "Todo", "second_menu": "All tasks" },
                { "first_menu": "Todo", "second_menu": "Today" },
                { "first_menu": "Todo", "second_menu": "Settings" },
                { "first_menu": "Admin", "second_menu": "Users" }
            ])
        );
        assert_eq!(reply.body["row_count"], 4);
        assert_eq!(reply.body["depth"], 3);
        assert_eq!(reply.body["groups"][0]["rowspan"], 3);
        assert_eq!(reply.body["groups"][1]["first_menu"], "Admin");
    }

    #[tokio::test]
    async fn test_flatten_accepts_string_wrapped_tree() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;

        let wrapped = Value::String(sample_tree().to_string());
        let reply = harness
            .call(
                Method::POST,
                "/api/menus/flatten",
                Some(&token),
                Some(json!({ "menu_structure": wrapped })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["row_count"], 4);
    }

    #[tokio::test]
    async fn test_malformed_tree_is_rejected_with_path() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;

        let reply = harness
            .call(
                Method::POST,
                "/api/menus",
                Some(&token),
                Some(json!({ "menu_structure": [ { "name": "A", "items": [ { "key": "x" } ] } ] })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"]["code"], "malformed_menu_tree");
        assert_eq!(reply.body["error"]["data"]["path"], "[0].items[0]");

        let menus = harness.call(Method::GET, "/api/menus", Some(&token), None).await;
        assert_eq!(menus.body, json!([]));
    }

    #[tokio::test]
    async fn test_menu_crud() {
        let harness = Harness::new();
        let (user_id, token) = harness.register("ada@example.com").await;
        let id = create_menu(&harness, &token, sample_tree()).await;

        let fetched = harness
            .call(Method::GET, &format!("/api/menus/{}", id), Some(&token), None)
            .await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.body["title"], "Main");
        assert_eq!(fetched.body["created_by"], user_id.as_str());

        let updated = harness
            .call(
                Method::PUT,
                &format!("/api/menus/{}", id),
                Some(&token),
                Some(json!({ "title": "Renamed" })),
            )
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["title"], "Renamed");

        let empty = harness
            .call(Method::PUT, &format!("/api/menus/{}", id), Some(&token), Some(json!({})))
            .await;
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let deleted = harness
            .call(Method::DELETE, &format!("/api/menus/{}", id), Some(&token), None)
            .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let gone = harness
            .call(Method::GET, &format!("/api/menus/{}", id), Some(&token), None)
            .await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_menu_id_is_bad_request() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;
        let reply = harness
            .call(Method::GET, "/api/menus/abc", Some(&token), None)
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_breadcrumbs_follow_route() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;
        let id = create_menu(&harness, &token, sample_tree()).await;

        let reply = harness
            .call(
                Method::GET,
                &format!("/api/menus/{}/breadcrumbs?route=/todo/dashboard/today", id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        let names: Vec<&str> = reply
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Todo", "Dashboard", "Today"]);
    }

    // =========================================================================
    // TODOS
    // =========================================================================

    #[tokio::test]
    async fn test_seed_from_menu_replaces_todos() {
        let harness = Harness::new();
        let (user_id, token) = harness.register("ada@example.com").await;
        let id = create_menu(&harness, &token, sample_tree()).await;

        harness
            .call(
                Method::POST,
                "/api/todos",
                Some(&token),
                Some(json!({ "title": "stale" })),
            )
            .await;

        let seeded = harness
            .call(
                Method::POST,
                &format!("/api/menus/{}/seed-todos", id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(seeded.status, StatusCode::OK, "{}", seeded.body);
        assert_eq!(
            seeded.body,
            json!({ "user_id": user_id, "removed": 1, "inserted": 4 })
        );
        assert_eq!(harness.backend.todo_count(), 4);

        let todos = harness.call(Method::GET, "/api/todos", Some(&token), None).await;
        let titles: Vec<&str> = todos
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect();
        assert!(!titles.contains(&"stale"));
        assert!(titles.contains(&"All tasks"));
    }

    #[tokio::test]
    async fn test_seed_leaves_other_users_alone() {
        let harness = Harness::new();
        let (_, ada) = harness.register("ada@example.com").await;
        let (_, bob) = harness.register("bob@example.com").await;

        harness
            .call(Method::POST, "/api/todos", Some(&bob), Some(json!({ "title": "bob's" })))
            .await;
        harness
            .call(
                Method::POST,
                "/api/todos/seed",
                Some(&ada),
                Some(json!({ "menu_structure": sample_tree() })),
            )
            .await;

        assert_eq!(harness.backend.todo_count(), 5);
    }

    #[tokio::test]
    async fn test_malformed_seed_keeps_existing_todos() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;
        harness
            .call(Method::POST, "/api/todos", Some(&token), Some(json!({ "title": "keep" })))
            .await;

        let reply = harness
            .call(
                Method::POST,
                "/api/todos/seed",
                Some(&token),
                Some(json!({ "menu_structure": { "name": "not an array" } })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(harness.backend.todo_count(), 1);
    }

    #[tokio::test]
    async fn test_grouped_todos_span_consecutive_rows() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;
        harness
            .call(
                Method::POST,
                "/api/todos/seed",
                Some(&token),
                Some(json!({ "menu_structure": sample_tree() })),
            )
            .await;

        let reply = harness
            .call(Method::GET, "/api/todos/grouped", Some(&token), None)
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let groups = reply.body.as_array().unwrap();
        let total: u64 = groups.iter().map(|g| g["rowspan"].as_u64().unwrap()).sum();
        assert_eq!(total, 4);
        for group in groups {
            let first = group["first_menu"].clone();
            for item in group["items"].as_array().unwrap() {
                assert_eq!(item["first_menu"], first);
            }
        }
    }

    #[tokio::test]
    async fn test_completion_and_bulk_delete() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;

        let mut ids = Vec::new();
        for title in ["one", "two", "three"] {
            let reply = harness
                .call(Method::POST, "/api/todos", Some(&token), Some(json!({ "title": title })))
                .await;
            assert_eq!(reply.status, StatusCode::CREATED);
            assert_eq!(reply.body["is_completed"], false);
            ids.push(reply.body["id"].as_i64().unwrap());
        }

        let done = harness
            .call(
                Method::PATCH,
                &format!("/api/todos/{}/completion", ids[0]),
                Some(&token),
                Some(json!({ "is_completed": true })),
            )
            .await;
        assert_eq!(done.status, StatusCode::OK);
        assert_eq!(done.body["is_completed"], true);

        let bulk = harness
            .call(
                Method::POST,
                "/api/todos/bulk-delete",
                Some(&token),
                Some(json!({ "ids": [ids[0], ids[1], 999_999] })),
            )
            .await;
        assert_eq!(bulk.status, StatusCode::OK);
        assert_eq!(bulk.body["deleted"], 2);

        let single = harness
            .call(Method::DELETE, &format!("/api/todos/{}", ids[2]), Some(&token), None)
            .await;
        assert_eq!(single.status, StatusCode::NO_CONTENT);
        assert_eq!(harness.backend.todo_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_todo_title_is_rejected() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;
        let reply = harness
            .call(Method::POST, "/api/todos", Some(&token), Some(json!({ "title": "  " })))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"]["data"]["fields"][0]["field"], "title");
    }

    // =========================================================================
    // USERS
    // =========================================================================

    #[tokio::test]
    async fn test_profile_update_shows_in_listing() {
        let harness = Harness::new();
        let (user_id, token) = harness.register("ada@example.com").await;

        let reply = harness
            .call(
                Method::PUT,
                &format!("/api/users/{}/profile", user_id),
                Some(&token),
                Some(json!({ "current_task": "Reviewing", "github_url": "https://github.com/ada" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);

        let users = harness.call(Method::GET, "/api/users", Some(&token), None).await;
        assert_eq!(users.body[0]["current_task"], "Reviewing");
        assert_eq!(users.body[0]["github_url"], "https://github.com/ada");
    }

    #[tokio::test]
    async fn test_delete_user_removes_account_and_profile() {
        let harness = Harness::new();
        let (_, admin) = harness.register("admin@example.com").await;
        let (bob_id, bob) = harness.register("bob@example.com").await;

        let reply = harness
            .call(Method::DELETE, &format!("/api/users/{}", bob_id), Some(&admin), None)
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        assert_eq!(reply.body["profiles_removed"], 1);

        let users = harness.call(Method::GET, "/api/users", Some(&admin), None).await;
        assert_eq!(users.body.as_array().unwrap().len(), 1);

        let me = harness.call(Method::GET, "/api/auth/me", Some(&bob), None).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);

        let again = harness
            .call(Method::DELETE, &format!("/api/users/{}", bob_id), Some(&admin), None)
            .await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
    }

    // =========================================================================
    // UPLOADS
    // =========================================================================

    #[tokio::test]
    async fn test_presign_places_file_under_folder() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;

        let reply = harness
            .call(
                Method::GET,
                "/api/uploads/presign?file=../avatar.png&folder=avatars",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        let key = reply.body["key"].as_str().unwrap();
        assert!(key.starts_with("avatars/"));
        assert!(key.ends_with("-avatar.png"));
        assert!(reply.body["fileUrl"].as_str().unwrap().ends_with(key));

        let bad = harness
            .call(
                Method::GET,
                "/api/uploads/presign?file=a.png&folder=../etc",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_image_upload_is_stored() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/uploads/image?file=me.png")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(vec![0x89, b'P', b'N', b'G']))
            .unwrap();
        let reply = harness.send(request).await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        let key = reply.body["key"].as_str().unwrap();
        assert!(key.starts_with("profiles/"));
        let key: ObjectKey = serde_json::from_value(json!(key)).unwrap();
        let stored = harness.storage.get(&key).expect("object stored");
        assert_eq!(stored.bytes, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(stored.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_oversized_image_is_rejected() {
        let mut config = GatewayConfig::default();
        config.limits.max_image_bytes = 8;
        let harness = Harness::with_config(config);
        let (_, token) = harness.register("ada@example.com").await;

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/uploads/image?file=me.png")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(vec![0u8; 9]))
            .unwrap();
        let reply = harness.send(request).await;
        assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(reply.body["error"]["code"], "payload_too_large");
        assert!(harness.storage.is_empty());
    }

    #[tokio::test]
    async fn test_empty_upload_is_bad_request() {
        let harness = Harness::new();
        let (_, token) = harness.register("ada@example.com").await;
        let reply = harness
            .call(Method::PUT, "/api/uploads/image?file=me.png", Some(&token), None)
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }
}
