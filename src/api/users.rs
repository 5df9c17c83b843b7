//! User CRUD endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{User, UserId};
use crate::infrastructure::user::{CreateUserRequest, UpdateUserRequest};

/// Raw paging parameters; values that do not parse are ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListUsersQuery {
    fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|v| v.trim().parse().ok())
    }

    fn offset(&self) -> Option<i64> {
        self.offset.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub count: usize,
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<i64>()
        .ok()
        .and_then(UserId::new)
        .ok_or_else(|| ApiError::invalid_id(raw))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    debug!(?query, "Listing users");

    let ctx = state.operation_context();
    let users = state
        .user_service
        .list_users(&ctx, query.limit(), query.offset())
        .await?;

    let count = users.len();
    Ok(Json(ListUsersResponse { users, count }))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = state.operation_context();
    let user = state.user_service.create_user(&ctx, request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&id)?;
    debug!(id = %id, "Getting user");

    let ctx = state.operation_context();
    let user = state.user_service.get_user(&ctx, id).await?;

    Ok(Json(user))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&id)?;

    let ctx = state.operation_context();
    let user = state.user_service.update_user(&ctx, id, request).await?;

    Ok(Json(user))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;

    let ctx = state.operation_context();
    state.user_service.delete_user(&ctx, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
