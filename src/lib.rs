pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;

/// Build the full HTTP router over the given state
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(user_routes())
        .merge(upload_routes(config.uploads.max_upload_bytes))
        .with_state(state);

    // Global middleware
    if config.api.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users", get(users::user_list))
        .route("/users/create", post(users::user_create))
        .route("/users/:id", get(users::user_show))
        .route("/users/edit/:id", patch(users::user_edit))
        .route("/users/update/:id", patch(users::user_update))
        .route("/users/delete/:id", delete(users::user_delete))
}

fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::image_upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
