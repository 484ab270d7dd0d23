//! User endpoints.
//!
//! # Endpoints
//!
//! - `GET /api/users` - List users (basic auth)
//! - `POST /api/users` - Create a user
//! - `GET /api/users/search` - Search stub
//! - `GET /api/users/{id}` - Fetch one user

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{CreateUserRequest, SearchUsersQuery, StatusPayload, UserDto};
use crate::state::AppState;

/// Message returned when `GET /api/users` has no authenticated principal.
pub const AUTH_FAILED_MESSAGE: &str =
    "Failed to authenticate the user! Please provice correct username or password.";

/// List all users. Requires a basic-auth principal.
///
/// Without one, answers HTTP 500 with a `failed` status payload whose
/// `statuscode` matches the HTTP status.
#[instrument(skip(state, principal))]
pub async fn list_users(State(state): State<AppState>, AuthUser(principal): AuthUser) -> Response {
    let Some(principal) = principal else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusPayload::failed(
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                AUTH_FAILED_MESSAGE,
            )),
        )
            .into_response();
    };
    info!(principal = ?principal, "Listing users");

    Json(state.users.get_all_users().await).into_response()
}

/// Fetch a user by numeric id.
#[instrument(skip(state))]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<UserDto>> {
    let id: u64 = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid user id: {id}")))?;

    state
        .users
        .get_user_by_id(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Create a user. Answers 201 with the created user.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let Json(request) = payload?;
    let user = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, query))]
pub async fn search_users(
    State(state): State<AppState>,
    query: Result<Query<SearchUsersQuery>, QueryRejection>,
) -> AppResult<Json<StatusPayload>> {
    let Query(query) = query?;
    Ok(Json(
        state
            .users
            .search_user(query.id, query.age, query.active)
            .await,
    ))
}
