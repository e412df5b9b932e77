// handlers/users/edit.rs - PATCH /users/edit/:id handler

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequestBody};
use crate::state::AppState;
use crate::types::{truthy, UserId};

#[derive(Debug, Deserialize)]
pub struct EditUserRequest {
    /// Any JSON value or form string; coerced by truthiness
    pub active: Option<Value>,
}

/// Overwrite the active flag.
///
/// There is no existence pre-check here: an unknown id surfaces as the
/// generic edit failure (500), unlike update and delete which answer 404.
pub async fn user_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RequestBody(request): RequestBody<EditUserRequest>,
) -> ApiResult<User> {
    let id: UserId = id.parse()?;
    let active = truthy(request.active.as_ref());

    match state.users.set_active(id, active).await {
        Ok(user) => {
            info!("Set user {} active={}", id, active);
            Ok(ApiResponse::success(user))
        }
        Err(e) => {
            error!("Failed to edit user {}: {}", id, e);
            Err(ApiError::internal_server_error("Error editing user"))
        }
    }
}
