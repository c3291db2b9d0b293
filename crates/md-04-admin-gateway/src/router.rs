//! Route table and middleware stack.
//!
//! ```text
//! GET    /health
//! POST   /api/auth/signup                  public
//! POST   /api/auth/login                   public
//! POST   /api/auth/logout
//! GET    /api/auth/me
//! GET    /api/menus                        POST /api/menus
//! GET    /api/menus/:id                    PUT, DELETE /api/menus/:id
//! POST   /api/menus/flatten
//! GET    /api/menus/:id/breadcrumbs?route=
//! POST   /api/menus/:id/seed-todos
//! GET    /api/todos                        POST /api/todos
//! GET    /api/todos/grouped
//! POST   /api/todos/seed
//! POST   /api/todos/bulk-delete
//! PATCH  /api/todos/:id/completion
//! DELETE /api/todos/:id
//! GET    /api/users
//! PUT    /api/users/:id/profile
//! DELETE /api/users/:id
//! GET    /api/uploads/presign?file=&folder=
//! PUT    /api/uploads/image?file=
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use md_02_datastore::AuthProvider;
use std::sync::Arc;

use crate::application::AdminService;
use crate::domain::GatewayConfig;
use crate::handlers;
use crate::middleware::{create_cors_layer, AuthLayer, TimeoutLayer, TracingLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AdminService>,
}

/// Build the full router.
///
/// `auth` resolves bearer tokens for every route except health, sign-up and
/// login.
pub fn build_router(
    config: &GatewayConfig,
    service: Arc<AdminService>,
    auth: Arc<dyn AuthProvider>,
) -> Router {
    let state = AppState { service };

    let public = Router::new()
        .route("/api/auth/signup", post(handlers::sign_up))
        .route("/api/auth/login", post(handlers::login));

    let protected = Router::new()
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        .route(
            "/api/menus",
            get(handlers::list_menus).post(handlers::create_menu),
        )
        .route("/api/menus/flatten", post(handlers::flatten_preview))
        .route(
            "/api/menus/:id",
            get(handlers::get_menu)
                .put(handlers::update_menu)
                .delete(handlers::delete_menu),
        )
        .route("/api/menus/:id/breadcrumbs", get(handlers::menu_breadcrumbs))
        .route("/api/menus/:id/seed-todos", post(handlers::seed_todos_from_menu))
        .route(
            "/api/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route("/api/todos/grouped", get(handlers::list_todos_grouped))
        .route("/api/todos/seed", post(handlers::seed_todos))
        .route("/api/todos/bulk-delete", post(handlers::bulk_delete_todos))
        .route("/api/todos/:id/completion", patch(handlers::set_completion))
        .route("/api/todos/:id", delete(handlers::delete_todo))
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/:id/profile", put(handlers::update_profile))
        .route("/api/users/:id", delete(handlers::delete_user))
        .route("/api/uploads/presign", get(handlers::presign_upload))
        .route("/api/uploads/image", put(handlers::upload_image))
        .route_layer(AuthLayer::new(auth));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(public)
        .merge(protected)
        .fallback(handlers::unknown_route)
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(TimeoutLayer::new(config.timeouts.request))
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new())
        .with_state(state)
}
