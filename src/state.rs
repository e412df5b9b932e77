use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::UserRepository;
use crate::services::UploadService;

/// Handles shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub uploads: Arc<UploadService>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, config: &AppConfig) -> Self {
        Self {
            users,
            uploads: Arc::new(UploadService::new(&config.uploads)),
        }
    }
}
