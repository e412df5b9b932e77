// handlers/users/show.rs - GET /users/:id handler

use axum::extract::{Path, State};
use tracing::{error, warn};

use crate::database::models::UserDetail;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::UserId;

/// Single user with its addresses and posts
pub async fn user_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserDetail> {
    let id: UserId = id.parse()?;

    match state.users.find_user_detail(id).await {
        Ok(Some(detail)) => Ok(ApiResponse::success(detail)),
        Ok(None) => {
            warn!("User {} not found", id);
            Err(ApiError::not_found("User not found"))
        }
        Err(e) => {
            error!("Failed to fetch user {}: {}", id, e);
            Err(ApiError::internal_server_error("Error fetching user"))
        }
    }
}
