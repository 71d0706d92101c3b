/// User CRUD and search endpoints
///
/// # Endpoints
///
/// - `GET /user/:id` - Fetch one user (public)
/// - `PUT /user/:id` - Update profile (authenticated, self or admin)
/// - `DELETE /user/:id` - Delete user (authenticated, self or admin)
/// - `GET /users` - List all users, id ascending
/// - `GET /users/search/:term` - Prefix search; 404 on no match

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiResult},
    routes::{auth::UserResponse, MessageResponse},
};
use axum::{
    extract::{Path, State},
    Json,
};
use paytrack_shared::auth::jwt::Claims;
use paytrack_shared::models::user::{UpdateUser, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

const USER_NOT_FOUND: &str = "User(s) not found.";
const USER_DELETED: &str = "User was successfully deleted.";

/// Profile update request (full field replacement; password excluded)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub user_name: String,

    #[validate(length(min = 1, max = 65, message = "First name must be 1-65 characters"))]
    pub fname: String,

    #[validate(length(min = 1, max = 65, message = "Last name must be 1-65 characters"))]
    pub lname: String,

    #[validate(length(min = 1, max = 20, message = "Role must be 1-20 characters"))]
    pub role: String,
}

/// Wrapped user list payload
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

/// Mutating a user account requires the caller to be that user, or any
/// user carrying the "admin" role.
async fn authorize_user_mutation(
    state: &AppState,
    claims: &Claims,
    target_id: i64,
) -> ApiResult<()> {
    if claims.sub == target_id {
        return Ok(());
    }

    let caller = User::find_by_id(&state.db, claims.sub).await?;
    match caller {
        Some(caller) if caller.role == "admin" => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Not permitted to modify this user.".to_string(),
        )),
    }
}

/// Fetch one user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.into()))
}

/// Update a user's profile by full field replacement
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    authorize_user_mutation(&state, &claims, user_id).await?;
    req.validate()?;

    let user = User::update(
        &state.db,
        user_id,
        UpdateUser {
            user_name: req.user_name,
            fname: req.fname,
            lname: req.lname,
            role: req.role,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.into()))
}

/// Delete a user
///
/// Fails with a constraint error when transactions still reference the
/// user; there is no cascading delete.
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    authorize_user_mutation(&state, &claims, user_id).await?;

    let deleted = User::delete(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    Ok(Json(MessageResponse::new(USER_DELETED)))
}

/// List all users, ordered by id ascending
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UsersResponse>> {
    let users = User::find_all(&state.db).await?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// Prefix search over users
///
/// No match is reported as 404, not as an error.
pub async fn search_users(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ApiResult<Json<UsersResponse>> {
    let users = User::text_search(&state.db, &term).await?;

    if users.is_empty() {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    Ok(Json(UsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}
