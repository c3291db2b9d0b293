//! Row repositories over the hosted `/rest/v1` API.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared_types::{
    AuthUser, Author, BackendError, BackendResult, MenuStructure, MenuStructureId,
    MenuStructurePatch, NewMenuStructure, NewTodo, ProfileUpdate, Todo, TodoId, UserId,
    UserProfile, UserSummary,
};

use super::client::{return_representation, single_object, HostedBackend};
use crate::ports::{MenuStructureRepository, ProfileRepository, TodoRepository};

const MENU_TABLE: &str = "menu_structures";
const TODO_TABLE: &str = "todos";
const PROFILE_TABLE: &str = "profile";
const USER_TABLE: &str = "users";

/// Row columns plus the creator's email and avatar.
const WITH_AUTHOR: &str = "*,users(email,profile(user_image))";

const USER_LISTING: &str =
    "id,email,created_at,profile(user_image,phone_number,github_url,current_task,today_completed_tasks_count)";

// =============================================================================
// MENU STRUCTURES
// =============================================================================

#[async_trait]
impl MenuStructureRepository for HostedBackend {
    async fn list(&self) -> BackendResult<Vec<MenuStructure>> {
        let request = self
            .rest_request(Method::GET, MENU_TABLE)
            .query(&[("select", WITH_AUTHOR), ("order", "created_at.desc")]);
        let rows: Vec<Value> = self.send_json(request).await?;
        rows.into_iter().map(decode_authored).collect()
    }

    async fn get(&self, id: MenuStructureId) -> BackendResult<MenuStructure> {
        let request = single_object(
            self.rest_request(Method::GET, MENU_TABLE)
                .query(&[("select", WITH_AUTHOR.to_string()), ("id", eq(id))]),
        );
        let row: Value = self
            .send_json(request)
            .await
            .map_err(|e| not_found_as(e, format!("menu structure {}", id)))?;
        decode_authored(row)
    }

    async fn create(&self, row: NewMenuStructure) -> BackendResult<MenuStructure> {
        let request = single_object(return_representation(
            self.rest_request(Method::POST, MENU_TABLE).json(&row),
        ));
        let created: Value = self.send_json(request).await?;
        decode_authored(created)
    }

    async fn update(
        &self,
        id: MenuStructureId,
        patch: MenuStructurePatch,
    ) -> BackendResult<MenuStructure> {
        let request = single_object(return_representation(
            self.rest_request(Method::PATCH, MENU_TABLE)
                .query(&[("id", eq(id))])
                .json(&patch),
        ));
        let updated: Value = self
            .send_json(request)
            .await
            .map_err(|e| not_found_as(e, format!("menu structure {}", id)))?;
        decode_authored(updated)
    }

    async fn delete(&self, id: MenuStructureId) -> BackendResult<()> {
        let request = return_representation(
            self.rest_request(Method::DELETE, MENU_TABLE)
                .query(&[("id", eq(id))]),
        );
        let removed: Vec<Value> = self.send_json(request).await?;
        if removed.is_empty() {
            return Err(BackendError::NotFound(format!("menu structure {}", id)));
        }
        Ok(())
    }
}

// =============================================================================
// TODOS
// =============================================================================

#[async_trait]
impl TodoRepository for HostedBackend {
    async fn list(&self) -> BackendResult<Vec<Todo>> {
        let request = self
            .rest_request(Method::GET, TODO_TABLE)
            .query(&[("select", WITH_AUTHOR), ("order", "created_at.desc")]);
        let rows: Vec<Value> = self.send_json(request).await?;
        rows.into_iter().map(decode_authored).collect()
    }

    async fn create(&self, todo: NewTodo) -> BackendResult<Todo> {
        let request = single_object(return_representation(
            self.rest_request(Method::POST, TODO_TABLE).json(&todo),
        ));
        let created: Value = self.send_json(request).await?;
        decode_authored(created)
    }

    async fn create_many(&self, todos: Vec<NewTodo>) -> BackendResult<Vec<Todo>> {
        if todos.is_empty() {
            return Ok(Vec::new());
        }
        // One bulk insert is one statement, so the batch lands or fails whole.
        let request = return_representation(
            self.rest_request(Method::POST, TODO_TABLE).json(&todos),
        );
        let created: Vec<Value> = self.send_json(request).await?;
        created.into_iter().map(decode_authored).collect()
    }

    async fn set_completion(&self, id: TodoId, is_completed: bool) -> BackendResult<Todo> {
        let request = single_object(return_representation(
            self.rest_request(Method::PATCH, TODO_TABLE)
                .query(&[("id", eq(id))])
                .json(&json!({ "is_completed": is_completed })),
        ));
        let updated: Value = self
            .send_json(request)
            .await
            .map_err(|e| not_found_as(e, format!("todo {}", id)))?;
        decode_authored(updated)
    }

    async fn delete(&self, id: TodoId) -> BackendResult<()> {
        let removed = self.delete_where(TODO_TABLE, "id", eq(id)).await?;
        if removed == 0 {
            return Err(BackendError::NotFound(format!("todo {}", id)));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[TodoId]) -> BackendResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let list = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.delete_where(TODO_TABLE, "id", format!("in.({})", list))
            .await
    }

    async fn delete_for_user(&self, user_id: &UserId) -> BackendResult<usize> {
        self.delete_where(TODO_TABLE, "user_id", eq(user_id)).await
    }
}

// =============================================================================
// PROFILES
// =============================================================================

#[async_trait]
impl ProfileRepository for HostedBackend {
    async fn list_users(&self) -> BackendResult<Vec<UserSummary>> {
        let request = self
            .rest_request(Method::GET, USER_TABLE)
            .query(&[("select", USER_LISTING)]);
        let rows: Vec<Value> = self.send_json(request).await?;
        rows.into_iter().map(decode_user_summary).collect()
    }

    async fn insert(&self, profile: UserProfile) -> BackendResult<UserProfile> {
        let request = single_object(return_representation(
            self.rest_request(Method::POST, PROFILE_TABLE).json(&profile),
        ));
        self.send_json(request).await
    }

    async fn upsert(&self, user_id: &UserId, update: ProfileUpdate) -> BackendResult<UserProfile> {
        let mut body = serde_json::to_value(&update)
            .map_err(|e| BackendError::Internal(format!("unencodable profile: {}", e)))?;
        if let Some(object) = body.as_object_mut() {
            object.insert("user_id".into(), json!(user_id));
        }
        let request = single_object(
            self.rest_request(Method::POST, PROFILE_TABLE)
                .query(&[("on_conflict", "user_id")])
                .header("Prefer", "resolution=merge-duplicates,return=representation")
                .json(&body),
        );
        self.send_json(request).await
    }

    async fn delete(&self, user_id: &UserId) -> BackendResult<usize> {
        self.delete_where(PROFILE_TABLE, "user_id", eq(user_id)).await
    }
}

impl HostedBackend {
    async fn delete_where(&self, table: &str, column: &str, filter: String) -> BackendResult<usize> {
        let request = return_representation(
            self.rest_request(Method::DELETE, table)
                .query(&[(column, filter)]),
        );
        let removed: Vec<Value> = self.send_json(request).await?;
        Ok(removed.len())
    }
}

// =============================================================================
// DECODING
// =============================================================================

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

/// Single-object reads answer 406 for a missing row; name the row instead.
fn not_found_as(err: BackendError, what: String) -> BackendError {
    match err {
        BackendError::NotFound(_) => BackendError::NotFound(what),
        other => other,
    }
}

/// Rows that can carry the embedded creator.
trait Authored: DeserializeOwned {
    fn set_author(&mut self, author: Option<Author>);
}

impl Authored for MenuStructure {
    fn set_author(&mut self, author: Option<Author>) {
        self.author = author;
    }
}

impl Authored for Todo {
    fn set_author(&mut self, author: Option<Author>) {
        self.author = author;
    }
}

fn decode_authored<T: Authored>(mut row: Value) -> BackendResult<T> {
    let author = take_author(&mut row);
    let mut decoded: T = decode(row)?;
    decoded.set_author(author);
    Ok(decoded)
}

fn take_author(row: &mut Value) -> Option<Author> {
    let embedded = row.as_object_mut()?.remove("users")?;
    if embedded.is_null() {
        return None;
    }
    let email = embedded
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let user_image = embedded_one(embedded.get("profile"))
        .and_then(|profile| profile.get("user_image"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    Some(Author { email, user_image })
}

/// Embedded relations come back as an object or a list depending on how the
/// foreign key is declared.
fn embedded_one(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Array(list) => list.first(),
        object @ Value::Object(_) => Some(object),
        _ => None,
    }
}

fn decode_user_summary(mut row: Value) -> BackendResult<UserSummary> {
    let profile = row
        .as_object_mut()
        .and_then(|object| object.remove("profile"));
    let profile: Option<UserProfile> = embedded_one(profile.as_ref())
        .map(|p| decode(p.clone()))
        .transpose()?;
    let user: AuthUser = decode(row)?;
    Ok(UserSummary::from_parts(&user, profile.as_ref()))
}

fn decode<T: DeserializeOwned>(value: Value) -> BackendResult<T> {
    serde_json::from_value(value)
        .map_err(|e| BackendError::Internal(format!("undecodable row: {}", e)))
}
