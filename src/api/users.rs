//! User API endpoints. Users only ever leave the service as `UserView`.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{require_non_blank, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, UserView};
use crate::projection::to_user_view;
use crate::AppState;

/// POST /api/users - Register a user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<UserView> {
    require_non_blank(&request.username, "Username")?;

    let user = state.repo.create_user(&request).await?;
    tracing::info!("Registered user {} as {}", user.id, user.role.as_str());
    success(to_user_view(&user))
}

/// GET /api/users/{id} - Get a single user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<UserView> {
    match state.repo.get_user(id).await? {
        Some(user) => success(to_user_view(&user)),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}
