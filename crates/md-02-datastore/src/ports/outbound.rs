//! Outbound ports: everything the admin service needs from the hosted
//! backend. Adapters live in [`crate::adapters`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{
    AuthUser, BackendResult, MenuStructure, MenuStructureId, MenuStructurePatch,
    NewMenuStructure, NewTodo, ProfileUpdate, Session, Todo, TodoId, UserId, UserProfile,
    UserSummary,
};

/// Hosted authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register an account. Duplicate emails are `Conflict`.
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser>;

    /// Exchange email and password for a session. Bad credentials are
    /// `Unauthorized`.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;

    /// Resolve a bearer token to its account.
    async fn user_for_token(&self, access_token: &str) -> BackendResult<AuthUser>;

    /// Remove an account. Requires administrative credentials.
    async fn admin_delete_user(&self, user_id: &UserId) -> BackendResult<()>;
}

/// `menu_structures` rows.
#[async_trait]
pub trait MenuStructureRepository: Send + Sync {
    /// All rows, newest first, with author details.
    async fn list(&self) -> BackendResult<Vec<MenuStructure>>;

    async fn get(&self, id: MenuStructureId) -> BackendResult<MenuStructure>;

    async fn create(&self, row: NewMenuStructure) -> BackendResult<MenuStructure>;

    async fn update(
        &self,
        id: MenuStructureId,
        patch: MenuStructurePatch,
    ) -> BackendResult<MenuStructure>;

    async fn delete(&self, id: MenuStructureId) -> BackendResult<()>;
}

/// `todos` rows.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All rows, newest first, with author details.
    async fn list(&self) -> BackendResult<Vec<Todo>>;

    async fn create(&self, todo: NewTodo) -> BackendResult<Todo>;

    /// Insert many rows in one request. Either all rows are stored or none.
    async fn create_many(&self, todos: Vec<NewTodo>) -> BackendResult<Vec<Todo>>;

    async fn set_completion(&self, id: TodoId, is_completed: bool) -> BackendResult<Todo>;

    async fn delete(&self, id: TodoId) -> BackendResult<()>;

    /// Delete the listed rows; ids that do not exist are skipped. Returns the
    /// number of rows removed.
    async fn delete_many(&self, ids: &[TodoId]) -> BackendResult<usize>;

    /// Delete every row owned by `user_id`. Returns the number removed.
    async fn delete_for_user(&self, user_id: &UserId) -> BackendResult<usize>;
}

/// `profile` rows and the user listing joined from them.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Every account with its profile, blanks filled in.
    async fn list_users(&self) -> BackendResult<Vec<UserSummary>>;

    async fn insert(&self, profile: UserProfile) -> BackendResult<UserProfile>;

    /// Insert or merge on `user_id`.
    async fn upsert(&self, user_id: &UserId, update: ProfileUpdate) -> BackendResult<UserProfile>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, user_id: &UserId) -> BackendResult<usize>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
