//! # Core Domain Entities
//!
//! Row shapes exchanged with the hosted backend. Field names match the
//! backend columns so the same types serialize straight into insert and
//! update payloads.
//!
//! ## Clusters
//!
//! - **Menus**: `MenuStructure`, `NewMenuStructure`, `MenuStructurePatch`
//! - **Todos**: `Todo`, `NewTodo`
//! - **People**: `AuthUser`, `Session`, `UserProfile`, `ProfileUpdate`, `UserSummary`

use crate::errors::BackendError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Longest user id accepted from callers.
pub const MAX_USER_ID_LEN: usize = 128;

/// Identifier issued by the auth provider for an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse a user id, trimming surrounding whitespace.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, BackendError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BackendError::Invalid("user id must not be empty".into()));
        }
        if trimmed.len() > MAX_USER_ID_LEN {
            return Err(BackendError::Invalid(format!(
                "user id longer than {} characters",
                MAX_USER_ID_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = BackendError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primary key of a `menu_structures` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuStructureId(pub i64);

impl fmt::Display for MenuStructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primary key of a `todos` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CLUSTER A: MENUS
// =============================================================================

/// Who created a row, as shown in listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_image: Option<String>,
}

/// A persisted menu tree together with its descriptive metadata.
///
/// `menu_structure` is kept as raw JSON: rows written by older clients hold
/// the tree as a JSON string rather than an array, and callers decide how
/// strictly to parse it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuStructure {
    pub id: MenuStructureId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub menu_structure: Value,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Insert payload for `menu_structures`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMenuStructure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    pub menu_structure: Value,
    pub created_by: UserId,
}

/// Partial update for `menu_structures`. The tree, when present, replaces the
/// stored one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuStructurePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_structure: Option<Value>,
}

impl MenuStructurePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.classification.is_none()
            && self.menu_structure.is_none()
    }

    /// Apply the patch to a stored row in place.
    pub fn apply(self, target: &mut MenuStructure) {
        if let Some(title) = self.title {
            target.title = Some(title);
        }
        if let Some(description) = self.description {
            target.description = Some(description);
        }
        if let Some(classification) = self.classification {
            target.classification = Some(classification);
        }
        if let Some(tree) = self.menu_structure {
            target.menu_structure = tree;
        }
    }
}

// =============================================================================
// CLUSTER B: TODOS
// =============================================================================

/// A trackable work item, usually seeded from a flattened menu tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub user_id: UserId,
    #[serde(default)]
    pub first_menu: Option<String>,
    #[serde(default)]
    pub second_menu: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Insert payload for `todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_menu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_menu: Option<String>,
}

impl NewTodo {
    /// A todo for one (first menu, second menu) pair. The leaf name doubles
    /// as the title.
    pub fn from_menu_pair(
        user_id: UserId,
        first_menu: impl Into<String>,
        second_menu: impl Into<String>,
    ) -> Self {
        let second_menu = second_menu.into();
        Self {
            title: second_menu.clone(),
            description: None,
            is_completed: false,
            user_id,
            first_menu: Some(first_menu.into()),
            second_menu: Some(second_menu),
        }
    }
}

// =============================================================================
// CLUSTER C: PEOPLE
// =============================================================================

/// An account as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A signed-in session issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Placeholder task recorded for freshly registered users.
pub const INITIAL_CURRENT_TASK: &str = "N/A";

/// A `profile` row, keyed by `user_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub current_task: Option<String>,
    #[serde(default)]
    pub today_completed_tasks_count: u32,
}

impl UserProfile {
    /// Profile created alongside a new account.
    pub fn initial(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            current_task: Some(INITIAL_CURRENT_TASK.to_string()),
            ..Self::default()
        }
    }
}

/// Profile fields to upsert. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_completed_tasks_count: Option<u32>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.user_image.is_none()
            && self.phone_number.is_none()
            && self.github_url.is_none()
            && self.current_task.is_none()
            && self.today_completed_tasks_count.is_none()
    }

    /// Merge into an existing profile (or a blank one for `user_id`).
    pub fn merge_into(self, user_id: UserId, existing: Option<UserProfile>) -> UserProfile {
        let mut profile = existing.unwrap_or_default();
        profile.user_id = Some(user_id);
        if let Some(v) = self.user_image {
            profile.user_image = Some(v);
        }
        if let Some(v) = self.phone_number {
            profile.phone_number = Some(v);
        }
        if let Some(v) = self.github_url {
            profile.github_url = Some(v);
        }
        if let Some(v) = self.current_task {
            profile.current_task = Some(v);
        }
        if let Some(v) = self.today_completed_tasks_count {
            profile.today_completed_tasks_count = v;
        }
        profile
    }
}

/// One row of the user administration listing: the account joined with its
/// profile, with blanks where no profile exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
    pub user_image: String,
    pub phone_number: String,
    pub github_url: String,
    pub current_task: String,
    pub today_completed_tasks_count: u32,
}

impl UserSummary {
    pub fn from_parts(user: &AuthUser, profile: Option<&UserProfile>) -> Self {
        let field = |value: Option<&String>| value.cloned().unwrap_or_default();
        Self {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or_default(),
            created_at: user.created_at,
            user_image: field(profile.and_then(|p| p.user_image.as_ref())),
            phone_number: field(profile.and_then(|p| p.phone_number.as_ref())),
            github_url: field(profile.and_then(|p| p.github_url.as_ref())),
            current_task: field(profile.and_then(|p| p.current_task.as_ref())),
            today_completed_tasks_count: profile
                .map(|p| p.today_completed_tasks_count)
                .unwrap_or(0),
        }
    }
}
