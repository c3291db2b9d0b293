//! Request and response bodies of the admin API.

use md_01_menu_tree::{FlattenedPair, MenuGroup};
use md_03_object_storage::ObjectKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{AuthUser, TodoId, UserId, UserProfile};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    /// Public URL of an already uploaded profile image
    #[serde(default)]
    pub user_image: Option<String>,
}

impl SignUpRequest {
    /// Every problem with the form, not just the first.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !looks_like_email(&self.email) {
            errors.push(FieldError::new("email", "a valid email address is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirmPassword", "passwords do not match"));
        }
        errors
    }
}

/// `local@domain.tld` with no whitespace; deliverability is the provider's
/// problem.
pub fn looks_like_email(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub user: AuthUser,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// MENUS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMenuRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    /// Array of nodes, or a JSON string holding one
    pub menu_structure: Value,
}

/// Absent fields stay as stored; a present `menu_structure` replaces the
/// whole tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMenuRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub menu_structure: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlattenRequest {
    pub menu_structure: Value,
}

/// What seeding from a tree would produce.
#[derive(Debug, Clone, Serialize)]
pub struct FlattenPreview {
    pub pairs: Vec<FlattenedPair>,
    pub groups: Vec<MenuGroup<FlattenedPair>>,
    pub row_count: usize,
    pub depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreadcrumbQuery {
    pub route: String,
}

// =============================================================================
// TODOS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub first_menu: Option<String>,
    #[serde(default)]
    pub second_menu: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    pub is_completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<TodoId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRequest {
    pub menu_structure: Value,
}

/// Outcome of replacing a user's todos with a tree's pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub user_id: UserId,
    pub removed: usize,
    pub inserted: usize,
}

// =============================================================================
// USERS & UPLOADS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DeleteUserResponse {
    pub user_id: UserId,
    pub profiles_removed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresignQuery {
    pub file: String,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub key: ObjectKey,
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
            ..SignUpRequest::default()
        }
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        assert!(form("a@example.com", "secret1", "secret1").validate().is_empty());
    }

    #[test]
    fn test_all_field_errors_collected() {
        let errors = form("nope", "123", "456").validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["email", "password", "confirmPassword"]);
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("a.b@c.io"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.com"));
        assert!(!looks_like_email("a b@c.com"));
        assert!(!looks_like_email("a@@c.com"));
    }

    #[test]
    fn test_sign_up_request_is_camel_case() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"email":"a@b.co","password":"x","confirmPassword":"x","githubUrl":"g"}"#,
        )
        .unwrap();
        assert_eq!(req.github_url.as_deref(), Some("g"));
    }
}
