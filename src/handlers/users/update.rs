// handlers/users/update.rs - PATCH /users/update/:id handler

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::database::models::UserChanges;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequestBody};
use crate::state::AppState;
use crate::types::UserId;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateUserResponse {
    pub message: &'static str,
}

pub async fn user_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RequestBody(request): RequestBody<UpdateUserRequest>,
) -> ApiResult<UpdateUserResponse> {
    let id: UserId = id.parse()?;

    let not_found = || {
        warn!("User {} not found", id);
        ApiError::not_found("User not found")
    };

    let existing = state.users.find_user(id).await.map_err(|e| {
        error!("Failed to look up user {}: {}", id, e);
        ApiError::internal_with_detail("Server error", e)
    })?;
    if existing.is_none() {
        return Err(not_found());
    }

    let changes = UserChanges {
        user_name: request.user_name,
        email: request.email,
    };

    match state.users.update_fields(id, changes).await {
        Ok(_) => {
            info!("Updated user {}", id);
            Ok(ApiResponse::success(UpdateUserResponse { message: "User updated" }))
        }
        // Removed between the check and the write
        Err(DatabaseError::NotFound(_)) => Err(not_found()),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(ApiError::internal_with_detail("Server error", e))
        }
    }
}
