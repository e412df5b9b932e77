use axum::extract::multipart::{Field, Multipart, MultipartError};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::UploadConfig;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("multipart field '{0}' not present")]
    MissingField(String),
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to move staged upload: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result of a completed upload
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub file_name: String,
}

/// Stores uploaded images under a single directory.
///
/// A part is streamed into a temp file staged inside the destination
/// directory and then renamed into place, so a half-written upload never
/// appears under its final name and the move stays on one filesystem.
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    field_name: String,
}

impl UploadService {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            field_name: config.field_name.clone(),
        }
    }

    /// Take the first part named after the configured field and persist it
    pub async fn store(&self, mut multipart: Multipart) -> Result<StoredUpload, UploadError> {
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some(self.field_name.as_str()) {
                return self.persist_field(field).await;
            }
            debug!("Skipping multipart field {:?}", field.name());
        }
        Err(UploadError::MissingField(self.field_name.clone()))
    }

    async fn persist_field(&self, mut field: Field<'_>) -> Result<StoredUpload, UploadError> {
        let original = sanitize_file_name(field.file_name());

        tokio::fs::create_dir_all(&self.dir).await?;

        let staged = tempfile::Builder::new()
            .prefix(".upload-")
            .tempfile_in(&self.dir)?;
        let mut file = tokio::fs::File::from_std(staged.as_file().try_clone()?);

        let mut bytes = 0u64;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        let file_name = generate_file_name(&original, Utc::now());
        let path = self.dir.join(&file_name);
        staged.persist_noclobber(&path)?;

        info!("Stored upload {} ({} bytes)", path.display(), bytes);
        Ok(StoredUpload { file_name })
    }
}

/// `{epochMillis}_{random token}_{original}`
pub fn generate_file_name(original: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}_{}", now.timestamp_millis(), Uuid::new_v4().simple(), original)
}

/// Keep only the last path component of a client-supplied name
pub fn sanitize_file_name(raw: Option<&str>) -> String {
    let name = raw
        .unwrap_or_default()
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match name {
        "" | "." | ".." => "upload".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_has_timestamp_token_and_original() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let name = generate_file_name("cat.png", now);

        let mut parts = name.splitn(3, '_');
        assert_eq!(parts.next(), Some("1700000000123"));
        let token = parts.next().unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(parts.next(), Some("cat.png"));
    }

    #[test]
    fn same_millisecond_same_name_does_not_collide() {
        let now = Utc::now();
        assert_ne!(generate_file_name("a.png", now), generate_file_name("a.png", now));
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_file_name(Some("C:\\photos\\me.jpg")), "me.jpg");
        assert_eq!(sanitize_file_name(Some("plain.gif")), "plain.gif");
    }

    #[test]
    fn sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_file_name(None), "upload");
        assert_eq!(sanitize_file_name(Some("")), "upload");
        assert_eq!(sanitize_file_name(Some("dir/")), "upload");
        assert_eq!(sanitize_file_name(Some("..")), "upload");
    }

    #[test]
    fn service_reads_config() {
        let config = crate::config::AppConfig::development().uploads;
        let service = UploadService::new(&config);
        assert_eq!(service.field_name, "imageFile");
        assert_eq!(service.dir, PathBuf::from("../uploads/users"));
    }
}
