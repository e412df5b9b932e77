// handlers/users/create.rs - POST /users/create handler

use axum::extract::State;
use serde::Deserialize;
use tracing::{error, info};

use crate::database::models::{NewAddress, NewPost, NewUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequestBody};
use crate::state::AppState;
use crate::types::OneOrMany;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub user_name: String,
    pub address: NewAddress,
    /// Zero or more seed posts: absent, a single object, or an array
    pub posts: Option<OneOrMany<NewPost>>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        NewUser {
            email: request.email,
            user_name: request.user_name,
            address: request.address,
            posts: request.posts.map(OneOrMany::into_vec).unwrap_or_default(),
        }
    }
}

/// Register a user together with its address and seed posts.
/// Responds with the user row only; nested children are not echoed back.
pub async fn user_create(
    State(state): State<AppState>,
    RequestBody(request): RequestBody<CreateUserRequest>,
) -> ApiResult<User> {
    match state.users.create_user(request.into()).await {
        Ok(user) => {
            info!("Created user {} <{}>", user.id, user.email);
            Ok(ApiResponse::success(user))
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(ApiError::internal_server_error("Error creating user"))
        }
    }
}
