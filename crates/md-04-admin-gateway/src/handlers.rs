//! HTTP handlers.
//!
//! Each handler unpacks the request, calls one [`AdminService`] operation and
//! wraps the result. Extraction failures come back through [`ApiError`] so
//! every error response has the same envelope.
//!
//! [`AdminService`]: crate::application::AdminService

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::{Extension, Json};
use md_01_menu_tree::{Crumb, MenuGroup};
use md_03_object_storage::PresignedUpload;
use shared_types::{
    AuthUser, MenuStructure, MenuStructureId, ProfileUpdate, Session, Todo, TodoId, UserId,
    UserProfile, UserSummary,
};

use crate::domain::{
    ApiError, ApiResult, BreadcrumbQuery, BulkDeleteRequest, BulkDeleteResponse,
    CompletionRequest, CreateMenuRequest, CreateTodoRequest, DeleteUserResponse, FlattenPreview,
    FlattenRequest, HealthResponse, LoginRequest, PresignQuery, SeedReport, SeedRequest,
    SignUpRequest, SignUpResponse, UpdateMenuRequest, UploadQuery, UploadedImage,
};
use crate::middleware::AuthenticatedUser;
use crate::router::AppState;

/// JSON body whose rejection is an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

/// Router fallback for paths with no route.
pub async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::not_found(format!("route {}", uri.path()))
}

// =============================================================================
// AUTH
// =============================================================================

pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<SignUpResponse>)> {
    let created = state.service.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.service.login(request).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    state.service.logout(&caller.access_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(Extension(caller): Extension<AuthenticatedUser>) -> Json<AuthUser> {
    Json(caller.user)
}

// =============================================================================
// MENUS
// =============================================================================

pub async fn list_menus(State(state): State<AppState>) -> ApiResult<Json<Vec<MenuStructure>>> {
    Ok(Json(state.service.list_menus().await?))
}

pub async fn get_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuStructureId>,
) -> ApiResult<Json<MenuStructure>> {
    Ok(Json(state.service.get_menu(id).await?))
}

pub async fn create_menu(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateMenuRequest>,
) -> ApiResult<(StatusCode, Json<MenuStructure>)> {
    let row = state.service.create_menu(&caller.user, request).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuStructureId>,
    ApiJson(request): ApiJson<UpdateMenuRequest>,
) -> ApiResult<Json<MenuStructure>> {
    Ok(Json(state.service.update_menu(id, request).await?))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuStructureId>,
) -> ApiResult<StatusCode> {
    state.service.delete_menu(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn flatten_preview(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FlattenRequest>,
) -> ApiResult<Json<FlattenPreview>> {
    Ok(Json(state.service.preview_flatten(&request.menu_structure)?))
}

pub async fn menu_breadcrumbs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuStructureId>,
    ApiQuery(query): ApiQuery<BreadcrumbQuery>,
) -> ApiResult<Json<Vec<Crumb>>> {
    Ok(Json(state.service.menu_breadcrumbs(id, &query.route).await?))
}

/// Replace the caller's todos with the flattened pairs of a stored tree.
pub async fn seed_todos_from_menu(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<MenuStructureId>,
) -> ApiResult<Json<SeedReport>> {
    Ok(Json(
        state.service.seed_todos_from_menu(&caller.user.id, id).await?,
    ))
}

// =============================================================================
// TODOS
// =============================================================================

pub async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.service.list_todos().await?))
}

pub async fn list_todos_grouped(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MenuGroup<Todo>>>> {
    Ok(Json(state.service.list_todos_grouped().await?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let todo = state.service.create_todo(&caller.user, request).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn seed_todos(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<SeedRequest>,
) -> ApiResult<Json<SeedReport>> {
    Ok(Json(
        state
            .service
            .seed_todos_from_tree(&caller.user.id, &request.menu_structure)
            .await?,
    ))
}

pub async fn bulk_delete_todos(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BulkDeleteRequest>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let deleted = state.service.delete_todos(&request.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}

pub async fn set_completion(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TodoId>,
    ApiJson(request): ApiJson<CompletionRequest>,
) -> ApiResult<Json<Todo>> {
    Ok(Json(
        state.service.set_completion(id, request.is_completed).await?,
    ))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TodoId>,
) -> ApiResult<StatusCode> {
    state.service.delete_todo(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// USERS
// =============================================================================

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.service.list_users().await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    let user_id = UserId::parse(user_id)?;
    Ok(Json(state.service.update_profile(&user_id, update).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let user_id = UserId::parse(user_id)?;
    Ok(Json(state.service.delete_user(&user_id).await?))
}

// =============================================================================
// UPLOADS
// =============================================================================

pub async fn presign_upload(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PresignQuery>,
) -> ApiResult<Json<PresignedUpload>> {
    Ok(Json(
        state
            .service
            .presign_upload(&query.file, query.folder.as_deref())
            .await?,
    ))
}

/// Raw image bytes in the body, file name in `?file=`.
pub async fn upload_image(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UploadQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<UploadedImage>)> {
    let body = body.map_err(ApiError::from)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let stored = state
        .service
        .upload_image(&query.file, body.to_vec(), content_type)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}
