//! `AdminService`: every operation the admin API exposes, independent of
//! HTTP.
//!
//! All collaborators are injected at construction. Menu trees are validated
//! before anything is written, and seeding todos replaces a user's rows
//! rather than appending to them.

use md_01_menu_tree::{breadcrumbs, group_consecutive, route_segments, Crumb, MenuForest, MenuGroup};
use md_02_datastore::{
    AuthProvider, BackendPorts, MenuStructureRepository, ProfileRepository, SystemTimeSource,
    TimeSource, TodoRepository,
};
use md_03_object_storage::{profile_image_key, upload_key, ObjectStorage, PresignedUpload};
use md_telemetry::{component_span, log_event};
use serde_json::Value;
use shared_types::{
    AuthUser, BackendError, MenuStructure, MenuStructureId, MenuStructurePatch, NewMenuStructure,
    NewTodo, ProfileUpdate, Session, Todo, TodoId, UserId, UserProfile, UserSummary,
    INITIAL_CURRENT_TASK,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::errors::{ServiceError, ServiceResult};
use crate::domain::{
    CreateMenuRequest, CreateTodoRequest, DeleteUserResponse, FieldError, FlattenPreview,
    LoginRequest, SeedReport, SignUpRequest, SignUpResponse, UpdateMenuRequest, UploadedImage,
};

const COMPONENT: &str = "admin-service";

/// Default cap on a single profile image.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub struct AdminService {
    auth: Arc<dyn AuthProvider>,
    menus: Arc<dyn MenuStructureRepository>,
    todos: Arc<dyn TodoRepository>,
    profiles: Arc<dyn ProfileRepository>,
    storage: Arc<dyn ObjectStorage>,
    clock: Arc<dyn TimeSource>,
    max_image_bytes: usize,
}

impl AdminService {
    pub fn new(ports: BackendPorts, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            auth: ports.auth,
            menus: ports.menus,
            todos: ports.todos,
            profiles: ports.profiles,
            storage,
            clock: Arc::new(SystemTimeSource),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, max: usize) -> Self {
        self.max_image_bytes = max;
        self
    }

    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Register an account and its profile row.
    pub async fn sign_up(&self, request: SignUpRequest) -> ServiceResult<SignUpResponse> {
        let errors = request.validate();
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let user = self
            .auth
            .sign_up(request.email.trim(), &request.password)
            .await?;

        let profile = UserProfile {
            user_id: Some(user.id.clone()),
            user_image: non_blank(request.user_image),
            phone_number: non_blank(request.phone_number),
            github_url: non_blank(request.github_url),
            current_task: Some(INITIAL_CURRENT_TASK.to_string()),
            today_completed_tasks_count: 0,
        };
        let profile = self.profiles.insert(profile).await?;

        log_event!(info, COMPONENT, "account registered", user_id = %user.id);
        Ok(SignUpResponse { user, profile })
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<Session> {
        let mut errors = Vec::new();
        if request.email.trim().is_empty() {
            errors.push(FieldError::new("email", "email is required"));
        }
        if request.password.is_empty() {
            errors.push(FieldError::new("password", "password is required"));
        }
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let session = self
            .auth
            .sign_in_with_password(request.email.trim(), &request.password)
            .await?;
        log_event!(info, COMPONENT, "signed in", user_id = %session.user.id);
        Ok(session)
    }

    pub async fn logout(&self, access_token: &str) -> ServiceResult<()> {
        self.auth.sign_out(access_token).await?;
        Ok(())
    }

    /// Resolve a bearer token. Blank tokens never reach the provider.
    pub async fn authenticate(&self, access_token: &str) -> ServiceResult<AuthUser> {
        if access_token.trim().is_empty() {
            return Err(BackendError::Unauthorized("missing bearer token".into()).into());
        }
        Ok(self.auth.user_for_token(access_token).await?)
    }

    // =========================================================================
    // MENUS
    // =========================================================================

    pub async fn list_menus(&self) -> ServiceResult<Vec<MenuStructure>> {
        Ok(self.menus.list().await?)
    }

    pub async fn get_menu(&self, id: MenuStructureId) -> ServiceResult<MenuStructure> {
        Ok(self.menus.get(id).await?)
    }

    pub async fn create_menu(
        &self,
        user: &AuthUser,
        request: CreateMenuRequest,
    ) -> ServiceResult<MenuStructure> {
        let (tree, forest) = validated_tree(request.menu_structure)?;
        let row = self
            .menus
            .create(NewMenuStructure {
                title: request.title,
                description: request.description,
                classification: request.classification,
                menu_structure: tree,
                created_by: user.id.clone(),
            })
            .await?;

        log_event!(
            info,
            COMPONENT,
            "menu structure created",
            menu_id = %row.id,
            leaves = forest.leaf_count()
        );
        Ok(row)
    }

    /// Update metadata and, when given, replace the whole tree.
    pub async fn update_menu(
        &self,
        id: MenuStructureId,
        request: UpdateMenuRequest,
    ) -> ServiceResult<MenuStructure> {
        let menu_structure = match request.menu_structure {
            Some(value) => Some(validated_tree(value)?.0),
            None => None,
        };
        let patch = MenuStructurePatch {
            title: request.title,
            description: request.description,
            classification: request.classification,
            menu_structure,
        };
        if patch.is_empty() {
            return Err(ServiceError::BadRequest("nothing to update".into()));
        }

        let row = self.menus.update(id, patch).await?;
        log_event!(info, COMPONENT, "menu structure updated", menu_id = %id);
        Ok(row)
    }

    pub async fn delete_menu(&self, id: MenuStructureId) -> ServiceResult<()> {
        self.menus.delete(id).await?;
        log_event!(info, COMPONENT, "menu structure deleted", menu_id = %id);
        Ok(())
    }

    /// Flatten without persisting anything.
    pub fn preview_flatten(&self, value: &Value) -> ServiceResult<FlattenPreview> {
        let forest = MenuForest::from_stored(value)?;
        let pairs = forest.flatten();
        let groups = group_consecutive(pairs.clone(), |p| Some(p.first_menu.as_str()));
        Ok(FlattenPreview {
            row_count: pairs.len(),
            depth: forest.depth(),
            pairs,
            groups,
        })
    }

    /// Names along `route` (node keys separated by `/`) in a stored tree.
    pub async fn menu_breadcrumbs(
        &self,
        id: MenuStructureId,
        route: &str,
    ) -> ServiceResult<Vec<Crumb>> {
        let menu = self.menus.get(id).await?;
        let forest = MenuForest::from_stored(&menu.menu_structure)?;
        Ok(breadcrumbs(forest.roots(), &route_segments(route)))
    }

    // =========================================================================
    // TODOS
    // =========================================================================

    pub async fn list_todos(&self) -> ServiceResult<Vec<Todo>> {
        Ok(self.todos.list().await?)
    }

    /// Todos in listing order, consecutive rows grouped by first menu.
    pub async fn list_todos_grouped(&self) -> ServiceResult<Vec<MenuGroup<Todo>>> {
        let todos = self.todos.list().await?;
        Ok(group_consecutive(todos, |t| t.first_menu.as_deref()))
    }

    pub async fn create_todo(
        &self,
        user: &AuthUser,
        request: CreateTodoRequest,
    ) -> ServiceResult<Todo> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation(vec![FieldError::new(
                "title",
                "title is required",
            )]));
        }
        let todo = self
            .todos
            .create(NewTodo {
                title: title.to_string(),
                description: non_blank(request.description),
                is_completed: false,
                user_id: user.id.clone(),
                first_menu: non_blank(request.first_menu),
                second_menu: non_blank(request.second_menu),
            })
            .await?;
        Ok(todo)
    }

    pub async fn set_completion(&self, id: TodoId, is_completed: bool) -> ServiceResult<Todo> {
        Ok(self.todos.set_completion(id, is_completed).await?)
    }

    pub async fn delete_todo(&self, id: TodoId) -> ServiceResult<()> {
        self.todos.delete(id).await?;
        Ok(())
    }

    /// Delete several todos; returns how many existed.
    pub async fn delete_todos(&self, ids: &[TodoId]) -> ServiceResult<usize> {
        let deleted = self.todos.delete_many(ids).await?;
        log_event!(info, COMPONENT, "todos deleted", requested = ids.len(), deleted);
        Ok(deleted)
    }

    /// Replace `user`'s todos with one per flattened pair of `tree`.
    pub async fn seed_todos_from_tree(
        &self,
        user: &UserId,
        tree: &Value,
    ) -> ServiceResult<SeedReport> {
        let forest = MenuForest::from_stored(tree)?;
        self.replace_todos(user, &forest).await
    }

    /// Same as [`seed_todos_from_tree`](Self::seed_todos_from_tree) for a
    /// stored menu structure.
    pub async fn seed_todos_from_menu(
        &self,
        user: &UserId,
        id: MenuStructureId,
    ) -> ServiceResult<SeedReport> {
        let menu = self.menus.get(id).await?;
        let forest = MenuForest::from_stored(&menu.menu_structure)?;
        self.replace_todos(user, &forest).await
    }

    async fn replace_todos(&self, user: &UserId, forest: &MenuForest) -> ServiceResult<SeedReport> {
        let span = component_span!("replace_todos", component = COMPONENT, user_id = %user);
        self.replace_todos_in_span(user, forest).instrument(span).await
    }

    async fn replace_todos_in_span(
        &self,
        user: &UserId,
        forest: &MenuForest,
    ) -> ServiceResult<SeedReport> {
        let rows: Vec<NewTodo> = forest
            .flatten()
            .into_iter()
            .map(|pair| NewTodo::from_menu_pair(user.clone(), pair.first_menu, pair.second_menu))
            .collect();

        let removed = self.todos.delete_for_user(user).await?;
        let inserted = match self.todos.create_many(rows).await {
            Ok(created) => created.len(),
            Err(cause) => {
                log_event!(
                    error,
                    COMPONENT,
                    "todo replacement left partially applied",
                    user_id = %user,
                    removed,
                    cause = %cause
                );
                return Err(ServiceError::PartialReplace { removed, cause });
            }
        };

        log_event!(info, COMPONENT, "todos seeded", user_id = %user, removed, inserted);
        Ok(SeedReport {
            user_id: user.clone(),
            removed,
            inserted,
        })
    }

    // =========================================================================
    // USERS
    // =========================================================================

    pub async fn list_users(&self) -> ServiceResult<Vec<UserSummary>> {
        Ok(self.profiles.list_users().await?)
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> ServiceResult<UserProfile> {
        if update.is_empty() {
            return Err(ServiceError::BadRequest("nothing to update".into()));
        }
        let profile = self.profiles.upsert(user_id, update).await?;
        log_event!(info, COMPONENT, "profile updated", user_id = %user_id);
        Ok(profile)
    }

    /// Remove the account, then its profile row.
    pub async fn delete_user(&self, user_id: &UserId) -> ServiceResult<DeleteUserResponse> {
        self.auth.admin_delete_user(user_id).await?;
        let profiles_removed = self.profiles.delete(user_id).await?;
        log_event!(info, COMPONENT, "user deleted", user_id = %user_id, profiles_removed);
        Ok(DeleteUserResponse {
            user_id: user_id.clone(),
            profiles_removed,
        })
    }

    // =========================================================================
    // UPLOADS
    // =========================================================================

    /// Presign a client-side upload under `folder` (default `uploads`).
    pub async fn presign_upload(
        &self,
        file_name: &str,
        folder: Option<&str>,
    ) -> ServiceResult<PresignedUpload> {
        let key = upload_key(folder, file_name, Uuid::new_v4())?;
        Ok(self.storage.presign_upload(&key).await?)
    }

    /// Store a profile image received by the gateway itself.
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> ServiceResult<UploadedImage> {
        if bytes.is_empty() {
            return Err(ServiceError::BadRequest("no file uploaded".into()));
        }
        if bytes.len() > self.max_image_bytes {
            return Err(ServiceError::PayloadTooLarge {
                size: bytes.len(),
                max: self.max_image_bytes,
            });
        }
        let key = profile_image_key(file_name, self.clock.now().timestamp_millis())?;
        let size = bytes.len();
        let file_url = self
            .storage
            .put_object(&key, bytes, content_type)
            .instrument(component_span!("put_object", component = COMPONENT, key = %key, size))
            .await?;
        log_event!(info, COMPONENT, "profile image stored", key = %key, size);
        Ok(UploadedImage { key, file_url })
    }
}

/// Validate a submitted tree and return it in array form for storage.
fn validated_tree(value: Value) -> ServiceResult<(Value, MenuForest)> {
    let forest = MenuForest::from_stored(&value)?;
    let tree = match value {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| BackendError::Internal(format!("re-reading menu tree: {}", e)))?,
        other => other,
    };
    Ok((tree, forest))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
