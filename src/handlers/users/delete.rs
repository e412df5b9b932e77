// handlers/users/delete.rs - DELETE /users/delete/:id handler

use axum::extract::{Path, State};
use tracing::{error, info, warn};

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::UserId;

/// Delete a user with its posts and addresses in one unit; responds with the removed row
pub async fn user_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let id: UserId = id.parse()?;

    match state.users.delete_user(id).await {
        Ok(Some(user)) => {
            info!("Deleted user {}", id);
            Ok(ApiResponse::success(user))
        }
        Ok(None) => {
            warn!("User {} not found", id);
            Err(ApiError::not_found("User not found"))
        }
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(ApiError::internal_with_detail("Error deleting user", e))
        }
    }
}
