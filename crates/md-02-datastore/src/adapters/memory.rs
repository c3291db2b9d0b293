//! In-memory backend for development and tests.
//!
//! Implements every port over one `parking_lot` lock. Passwords are stored as
//! salted SHA-256 digests and sessions as random bearer tokens, so the auth
//! flow behaves like the hosted one without any network.

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::RngCore;
use sha2::{Digest, Sha256};
use shared_types::{
    AuthUser, Author, BackendError, BackendResult, MenuStructure, MenuStructureId,
    MenuStructurePatch, NewMenuStructure, NewTodo, ProfileUpdate, Session, Todo, TodoId, UserId,
    UserProfile, UserSummary,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::ports::{
    AuthProvider, MenuStructureRepository, ProfileRepository, SystemTimeSource, TimeSource,
    TodoRepository,
};

/// Lifetime reported for issued sessions.
const SESSION_TTL_SECS: u64 = 3600;

struct Account {
    user: AuthUser,
    salt: [u8; 16],
    password_digest: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<UserId, Account>,
    tokens: HashMap<String, UserId>,
    menus: BTreeMap<i64, MenuStructure>,
    todos: BTreeMap<i64, Todo>,
    profiles: HashMap<UserId, UserProfile>,
    next_menu_id: i64,
    next_todo_id: i64,
}

/// All four ports backed by process memory.
pub struct InMemoryBackend {
    state: RwLock<State>,
    clock: Arc<dyn TimeSource>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_time_source(Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            state: RwLock::new(State {
                next_menu_id: 1,
                next_todo_id: 1,
                ..State::default()
            }),
            clock,
        }
    }

    /// Number of todo rows, for assertions.
    pub fn todo_count(&self) -> usize {
        self.state.read().todos.len()
    }

    /// Number of live sessions, for assertions.
    pub fn session_count(&self) -> usize {
        self.state.read().tokens.len()
    }

    fn author_of(state: &State, user_id: Option<&UserId>) -> Option<Author> {
        let user_id = user_id?;
        let account = state.accounts.get(user_id);
        let profile = state.profiles.get(user_id);
        if account.is_none() && profile.is_none() {
            return None;
        }
        Some(Author {
            email: account.and_then(|a| a.user.email.clone()),
            user_image: profile.and_then(|p| p.user_image.clone()),
        })
    }

    fn insert_todo(&self, state: &mut State, todo: NewTodo) -> Todo {
        let id = state.next_todo_id;
        state.next_todo_id += 1;
        let row = Todo {
            id: TodoId(id),
            title: todo.title,
            description: todo.description,
            is_completed: todo.is_completed,
            user_id: todo.user_id,
            first_menu: todo.first_menu,
            second_menu: todo.second_menu,
            created_at: self.clock.now(),
            updated_at: None,
            author: None,
        };
        state.todos.insert(id, row.clone());
        row
    }
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Newest first; rows created in the same instant fall back to id order.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

// =============================================================================
// AUTH
// =============================================================================

#[async_trait]
impl AuthProvider for InMemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let email = normalize_email(email);
        let mut state = self.state.write();
        if state
            .accounts
            .values()
            .any(|a| a.user.email.as_deref() == Some(email.as_str()))
        {
            return Err(BackendError::Conflict("User already registered".into()));
        }

        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let user = AuthUser {
            id: UserId::parse(uuid::Uuid::new_v4().to_string())?,
            email: Some(email),
            created_at: Some(self.clock.now()),
        };
        state.accounts.insert(
            user.id.clone(),
            Account {
                user: user.clone(),
                salt,
                password_digest: digest(&salt, password),
            },
        );
        debug!(user_id = %user.id, "in-memory account created");
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let email = normalize_email(email);
        let mut state = self.state.write();
        let user = state
            .accounts
            .values()
            .find(|a| {
                a.user.email.as_deref() == Some(email.as_str())
                    && a.password_digest == digest(&a.salt, password)
            })
            .map(|a| a.user.clone())
            .ok_or_else(|| BackendError::Unauthorized("Invalid login credentials".into()))?;

        let access_token = random_token();
        state.tokens.insert(access_token.clone(), user.id.clone());
        Ok(Session {
            access_token,
            token_type: "bearer".into(),
            expires_in: Some(SESSION_TTL_SECS),
            refresh_token: Some(random_token()),
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        match self.state.write().tokens.remove(access_token) {
            Some(_) => Ok(()),
            None => Err(BackendError::Unauthorized("session not found".into())),
        }
    }

    async fn user_for_token(&self, access_token: &str) -> BackendResult<AuthUser> {
        let state = self.state.read();
        state
            .tokens
            .get(access_token)
            .and_then(|id| state.accounts.get(id))
            .map(|a| a.user.clone())
            .ok_or_else(|| BackendError::Unauthorized("invalid or expired token".into()))
    }

    async fn admin_delete_user(&self, user_id: &UserId) -> BackendResult<()> {
        let mut state = self.state.write();
        if state.accounts.remove(user_id).is_none() {
            return Err(BackendError::NotFound(format!("user {}", user_id)));
        }
        state.tokens.retain(|_, owner| owner != user_id);
        Ok(())
    }
}

// =============================================================================
// MENU STRUCTURES
// =============================================================================

#[async_trait]
impl MenuStructureRepository for InMemoryBackend {
    async fn list(&self) -> BackendResult<Vec<MenuStructure>> {
        let state = self.state.read();
        let mut rows: Vec<MenuStructure> = state
            .menus
            .values()
            .map(|row| MenuStructure {
                author: Self::author_of(&state, row.created_by.as_ref()),
                ..row.clone()
            })
            .collect();
        newest_first(&mut rows, |r| (r.created_at, r.id.0));
        Ok(rows)
    }

    async fn get(&self, id: MenuStructureId) -> BackendResult<MenuStructure> {
        let state = self.state.read();
        let row = state
            .menus
            .get(&id.0)
            .ok_or_else(|| BackendError::NotFound(format!("menu structure {}", id)))?;
        Ok(MenuStructure {
            author: Self::author_of(&state, row.created_by.as_ref()),
            ..row.clone()
        })
    }

    async fn create(&self, row: NewMenuStructure) -> BackendResult<MenuStructure> {
        let mut state = self.state.write();
        let id = state.next_menu_id;
        state.next_menu_id += 1;
        let stored = MenuStructure {
            id: MenuStructureId(id),
            title: row.title,
            description: row.description,
            classification: row.classification,
            menu_structure: row.menu_structure,
            created_by: Some(row.created_by),
            created_at: self.clock.now(),
            updated_at: None,
            author: None,
        };
        state.menus.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: MenuStructureId,
        patch: MenuStructurePatch,
    ) -> BackendResult<MenuStructure> {
        let now = self.clock.now();
        let mut state = self.state.write();
        let row = state
            .menus
            .get_mut(&id.0)
            .ok_or_else(|| BackendError::NotFound(format!("menu structure {}", id)))?;
        patch.apply(row);
        row.updated_at = Some(now);
        Ok(row.clone())
    }

    async fn delete(&self, id: MenuStructureId) -> BackendResult<()> {
        self.state
            .write()
            .menus
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("menu structure {}", id)))
    }
}

// =============================================================================
// TODOS
// =============================================================================

#[async_trait]
impl TodoRepository for InMemoryBackend {
    async fn list(&self) -> BackendResult<Vec<Todo>> {
        let state = self.state.read();
        let mut rows: Vec<Todo> = state
            .todos
            .values()
            .map(|row| Todo {
                author: Self::author_of(&state, Some(&row.user_id)),
                ..row.clone()
            })
            .collect();
        newest_first(&mut rows, |r| (r.created_at, r.id.0));
        Ok(rows)
    }

    async fn create(&self, todo: NewTodo) -> BackendResult<Todo> {
        let mut state = self.state.write();
        Ok(self.insert_todo(&mut state, todo))
    }

    async fn create_many(&self, todos: Vec<NewTodo>) -> BackendResult<Vec<Todo>> {
        let mut state = self.state.write();
        Ok(todos
            .into_iter()
            .map(|todo| self.insert_todo(&mut state, todo))
            .collect())
    }

    async fn set_completion(&self, id: TodoId, is_completed: bool) -> BackendResult<Todo> {
        let now = self.clock.now();
        let mut state = self.state.write();
        let row = state
            .todos
            .get_mut(&id.0)
            .ok_or_else(|| BackendError::NotFound(format!("todo {}", id)))?;
        row.is_completed = is_completed;
        row.updated_at = Some(now);
        Ok(row.clone())
    }

    async fn delete(&self, id: TodoId) -> BackendResult<()> {
        self.state
            .write()
            .todos
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("todo {}", id)))
    }

    async fn delete_many(&self, ids: &[TodoId]) -> BackendResult<usize> {
        let mut state = self.state.write();
        Ok(ids
            .iter()
            .filter(|id| state.todos.remove(&id.0).is_some())
            .count())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> BackendResult<usize> {
        let mut state = self.state.write();
        let before = state.todos.len();
        state.todos.retain(|_, todo| &todo.user_id != user_id);
        Ok(before - state.todos.len())
    }
}

// =============================================================================
// PROFILES
// =============================================================================

#[async_trait]
impl ProfileRepository for InMemoryBackend {
    async fn list_users(&self) -> BackendResult<Vec<UserSummary>> {
        let state = self.state.read();
        let mut users: Vec<UserSummary> = state
            .accounts
            .values()
            .map(|a| UserSummary::from_parts(&a.user, state.profiles.get(&a.user.id)))
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn insert(&self, profile: UserProfile) -> BackendResult<UserProfile> {
        let user_id = profile
            .user_id
            .clone()
            .ok_or_else(|| BackendError::Invalid("profile requires user_id".into()))?;
        let mut state = self.state.write();
        if state.profiles.contains_key(&user_id) {
            return Err(BackendError::Conflict(format!("profile for {} exists", user_id)));
        }
        state.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn upsert(&self, user_id: &UserId, update: ProfileUpdate) -> BackendResult<UserProfile> {
        let mut state = self.state.write();
        let existing = state.profiles.remove(user_id);
        let merged = update.merge_into(user_id.clone(), existing);
        state.profiles.insert(user_id.clone(), merged.clone());
        Ok(merged)
    }

    async fn delete(&self, user_id: &UserId) -> BackendResult<usize> {
        Ok(usize::from(self.state.write().profiles.remove(user_id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that advances one second per reading.
    struct TickingClock(AtomicI64);

    impl TimeSource for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let secs = self.0.fetch_add(1, Ordering::SeqCst);
            Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap()
        }
    }

    fn backend() -> InMemoryBackend {
        InMemoryBackend::with_time_source(Arc::new(TickingClock(AtomicI64::new(0))))
    }

    fn uid(raw: &str) -> UserId {
        UserId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_sign_in_sign_out() {
        let backend = backend();
        let user = backend.sign_up("A@Example.com ", "secret1").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("a@example.com"));

        let session = backend
            .sign_in_with_password("a@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(backend.user_for_token(&session.access_token).await.unwrap().id, user.id);

        backend.sign_out(&session.access_token).await.unwrap();
        assert!(matches!(
            backend.user_for_token(&session.access_token).await,
            Err(BackendError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_conflicts() {
        let backend = backend();
        backend.sign_up("a@example.com", "secret1").await.unwrap();
        let err = backend.sign_up("a@example.com", "other12").await.unwrap_err();
        assert!(matches!(err, BackendError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_unauthorized() {
        let backend = backend();
        backend.sign_up("a@example.com", "secret1").await.unwrap();
        let err = backend
            .sign_in_with_password("a@example.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_menus_newest_first_with_author() {
        let backend = backend();
        let user = backend.sign_up("a@example.com", "secret1").await.unwrap();
        for title in ["first", "second"] {
            MenuStructureRepository::create(
                &backend,
                NewMenuStructure {
                    title: Some(title.into()),
                    description: None,
                    classification: None,
                    menu_structure: serde_json::json!([]),
                    created_by: user.id.clone(),
                },
            )
            .await
            .unwrap();
        }
        let rows = MenuStructureRepository::list(&backend).await.unwrap();
        assert_eq!(rows[0].title.as_deref(), Some("second"));
        assert_eq!(
            rows[0].author.as_ref().and_then(|a| a.email.as_deref()),
            Some("a@example.com")
        );
    }

    #[tokio::test]
    async fn test_menu_update_and_delete_missing() {
        let backend = backend();
        let err = MenuStructureRepository::update(
            &backend,
            MenuStructureId(9),
            MenuStructurePatch::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
        assert!(MenuStructureRepository::delete(&backend, MenuStructureId(9)).await.is_err());
    }

    #[tokio::test]
    async fn test_todo_bulk_operations() {
        let backend = backend();
        let alice = uid("alice");
        let bob = uid("bob");
        let created = backend
            .create_many(vec![
                NewTodo::from_menu_pair(alice.clone(), "A", "x"),
                NewTodo::from_menu_pair(alice.clone(), "A", "y"),
                NewTodo::from_menu_pair(bob.clone(), "B", "z"),
            ])
            .await
            .unwrap();
        assert_eq!(created.len(), 3);

        let removed = backend.delete_for_user(&alice).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(backend.todo_count(), 1);

        let removed = backend
            .delete_many(&[created[2].id, TodoId(999)])
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_set_completion() {
        let backend = backend();
        let todo = TodoRepository::create(&backend, NewTodo::from_menu_pair(uid("u"), "A", "x"))
            .await
            .unwrap();
        let updated = backend.set_completion(todo.id, true).await.unwrap();
        assert!(updated.is_completed);
        assert!(updated.updated_at.is_some());
        assert!(backend.set_completion(TodoId(42), true).await.is_err());
    }

    #[tokio::test]
    async fn test_profiles_listing_and_upsert() {
        let backend = backend();
        let user = backend.sign_up("a@example.com", "secret1").await.unwrap();
        backend.insert(UserProfile::initial(user.id.clone())).await.unwrap();

        let users = backend.list_users().await.unwrap();
        assert_eq!(users[0].current_task, "N/A");

        let merged = backend
            .upsert(
                &user.id,
                ProfileUpdate {
                    phone_number: Some("010-0000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(merged.current_task.as_deref(), Some("N/A"));
        assert_eq!(merged.phone_number.as_deref(), Some("010-0000"));

        assert_eq!(ProfileRepository::delete(&backend, &user.id).await.unwrap(), 1);
        assert_eq!(ProfileRepository::delete(&backend, &user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_admin_delete_revokes_sessions() {
        let backend = backend();
        let user = backend.sign_up("a@example.com", "secret1").await.unwrap();
        backend
            .sign_in_with_password("a@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(backend.session_count(), 1);
        backend.admin_delete_user(&user.id).await.unwrap();
        assert_eq!(backend.session_count(), 0);
        assert!(backend.admin_delete_user(&user.id).await.is_err());
    }
}
