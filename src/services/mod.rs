pub mod upload_service;

pub use upload_service::{StoredUpload, UploadError, UploadService};
