//! File storage abstraction used for user avatars.
//!
//! [`FileStorage`] hides where uploaded bytes end up; [`LocalFileStorage`] writes
//! them below a base directory and builds public URLs from a base URL. Uploads are
//! validated for size and MIME type before anything touches the disk.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::fs;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Image MIME types accepted for avatars, with the extension used on disk.
pub const IMAGE_MIME_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

pub trait FileStorage: Send + Sync {
    /// Save `content` under `key` and return the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Delete a file. Deleting a missing file succeeds.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Public URL for a stored key.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;

    /// Reverse of [`FileStorage::get_url`]: the key behind a URL this storage produced.
    fn key_from_url(&self, url: &str) -> Option<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File exceeds maximum size of {max_bytes} bytes")]
    InvalidFileSize { max_bytes: usize },

    #[error("File is empty")]
    EmptyFile,

    #[error("MIME type '{received}' not allowed. Allowed types: {}", allowed.join(", "))]
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    /// Whether the error was caused by the uploaded content rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFileSize { .. } | Self::EmptyFile | Self::InvalidMimeType { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
    allowed_mime_types: Vec<String>,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_file_size,
            allowed_mime_types: IMAGE_MIME_TYPES
                .iter()
                .map(|(mime, _)| mime.to_string())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Check an upload against the size limit and MIME allow-list and return the
    /// file extension to store it under.
    pub fn validate_upload(&self, content_type: &str, len: usize) -> Result<&'static str, StorageError> {
        if len == 0 {
            return Err(StorageError::EmptyFile);
        }
        if len > self.max_file_size {
            return Err(StorageError::InvalidFileSize {
                max_bytes: self.max_file_size,
            });
        }

        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        IMAGE_MIME_TYPES
            .iter()
            .find(|(allowed, _)| *allowed == mime && self.allowed_mime_types.iter().any(|m| m == allowed))
            .map(|(_, ext)| *ext)
            .ok_or_else(|| StorageError::InvalidMimeType {
                received: mime,
                allowed: self.allowed_mime_types.clone(),
            })
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::Io(e)),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url, key))
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.base_url)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .filter(|key| Self::validate_key(key).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: PathBuf) -> LocalFileStorage {
        LocalFileStorage::new(dir, "http://localhost:3000/uploads/".to_string(), 1024)
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("coursebook-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn accepts_known_image_types() {
        let s = storage(temp_dir());
        assert_eq!(s.validate_upload("image/png", 10).unwrap(), "png");
        assert_eq!(s.validate_upload("image/jpeg", 10).unwrap(), "jpg");
        assert_eq!(s.validate_upload("IMAGE/WEBP; q=1", 10).unwrap(), "webp");
    }

    #[test]
    fn rejects_other_types_and_sizes() {
        let s = storage(temp_dir());
        assert!(matches!(
            s.validate_upload("application/pdf", 10),
            Err(StorageError::InvalidMimeType { .. })
        ));
        assert!(matches!(
            s.validate_upload("image/png", 2048),
            Err(StorageError::InvalidFileSize { max_bytes: 1024 })
        ));
        assert!(matches!(
            s.validate_upload("image/png", 0),
            Err(StorageError::EmptyFile)
        ));
    }

    #[test]
    fn rejects_path_traversal() {
        let s = storage(temp_dir());
        assert!(s.get_url("../etc/passwd").is_err());
        assert!(s.get_url("/abs").is_err());
        assert!(s.get_url("avatars/a b.png").is_err());
    }

    #[test]
    fn url_and_key_round_trip() {
        let s = storage(temp_dir());
        let url = s.get_url("avatars/user-1.png").unwrap();
        assert_eq!(url, "http://localhost:3000/uploads/avatars/user-1.png");
        assert_eq!(s.key_from_url(&url).as_deref(), Some("avatars/user-1.png"));
        assert_eq!(s.key_from_url("https://cdn.example.com/x.png"), None);
    }

    #[tokio::test]
    async fn save_and_delete() {
        let dir = temp_dir();
        let s = storage(dir.clone());

        let key = s.save("avatars/test.png", b"png-bytes").await.unwrap();
        assert_eq!(key, "avatars/test.png");
        assert!(dir.join("avatars/test.png").exists());

        s.delete(&key).await.unwrap();
        assert!(!dir.join("avatars/test.png").exists());

        // deleting twice is fine
        s.delete(&key).await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }
}
