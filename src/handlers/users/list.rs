// handlers/users/list.rs - GET /users handler

use axum::extract::State;
use tracing::error;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.users.list_users().await.map_err(|e| {
        error!("Failed to list users: {}", e);
        ApiError::internal_server_error("Error fetching users")
    })?;
    Ok(ApiResponse::success(users))
}
