//! Storage service implementation using Apache OpenDAL.

use opendal::{ErrorKind, Operator, services};

use super::config::{StorageMode, StorageProvider};
use super::error::StorageError;

/// Cache lifetime sent with remote writes. Keys are never overwritten, so
/// stored objects are immutable and can be cached for a year.
const CACHE_CONTROL: &str = "max-age=31536000";

/// Storage service for profile image objects.
///
/// Wraps an OpenDAL [`Operator`] built once from the resolved provider.
/// All keys are backend-agnostic; [`StorageService::url_for`] composes the
/// public URL from the configured media base URL regardless of which
/// backend holds the bytes.
pub struct StorageService {
    operator: Operator,
    mode: StorageMode,
    media_base_url: String,
}

impl StorageService {
    /// Builds the storage service from a resolved provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operator cannot be initialized.
    pub fn from_provider(
        provider: StorageProvider,
        media_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let mode = provider.mode();
        let operator = Self::create_operator(&provider)?;
        let media_base_url = media_base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            operator,
            mode,
            media_base_url,
        })
    }

    /// Create the OpenDAL operator for the resolved provider.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::Remote {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let mut builder = services::S3::default()
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::Local { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid root path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Writes an object under `key` and returns the key.
    ///
    /// Remote writes carry the content type and a long-lived cache-control
    /// header; the filesystem backend stores no object metadata and takes a
    /// plain write. Parent directories implied by the key are created by
    /// the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        match self.mode {
            StorageMode::Remote => {
                self.operator
                    .write_with(key, bytes)
                    .content_type(content_type)
                    .cache_control(CACHE_CONTROL)
                    .await?;
            }
            StorageMode::Local => {
                self.operator.write(key, bytes).await?;
            }
        }

        Ok(key.to_string())
    }

    /// Deletes the object under `key`. Idempotent: deleting an absent key
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails for any reason other than the
    /// key being absent.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Ok(());
        }
        match self.operator.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads an object back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        Ok(self.operator.read(key).await?.to_vec())
    }

    /// Checks whether an object exists under `key`.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Composes the public URL for a stored key.
    ///
    /// The URL depends only on the configured media base URL and the key,
    /// never on the active backend. Returns `None` for an empty key.
    #[must_use]
    pub fn url_for(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.media_base_url, key))
    }

    /// The active storage mode.
    #[must_use]
    pub const fn mode(&self) -> StorageMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_service(root: &std::path::Path) -> StorageService {
        StorageService::from_provider(StorageProvider::local(root), "https://media.example.com")
            .expect("local backend should initialize")
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let service = local_service(dir.path());

        let key = service
            .put("pp/alice-42.jpg", b"jpeg bytes".to_vec(), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(key, "pp/alice-42.jpg");
        assert_eq!(service.get(&key).await.unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_put_creates_nested_parents() {
        let dir = tempfile::tempdir().unwrap();
        let service = local_service(dir.path());

        service
            .put("pp/bob-7.jpg", b"x".to_vec(), "image/jpeg")
            .await
            .unwrap();

        assert!(dir.path().join("pp").join("bob-7.jpg").exists());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let service = local_service(dir.path());

        service
            .put("pp/carol-1.jpg", b"x".to_vec(), "image/jpeg")
            .await
            .unwrap();

        service.delete("pp/carol-1.jpg").await.unwrap();
        // Second delete of the same key, a delete of a key that never
        // existed, and a delete of an empty key all succeed.
        service.delete("pp/carol-1.jpg").await.unwrap();
        service.delete("pp/never-written.jpg").await.unwrap();
        service.delete("").await.unwrap();

        assert!(!service.exists("pp/carol-1.jpg").await);
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = local_service(dir.path());

        let err = service.get("pp/ghost-0.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_url_for_is_backend_independent() {
        let dir = tempfile::tempdir().unwrap();
        let service = local_service(dir.path());

        assert_eq!(
            service.url_for("pp/alice-42.jpg"),
            Some("https://media.example.com/pp/alice-42.jpg".to_string())
        );
        assert_eq!(service.url_for(""), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let service = StorageService::from_provider(
            StorageProvider::local(dir.path()),
            "https://media.example.com/",
        )
        .unwrap();

        assert_eq!(
            service.url_for("pp/a-1.jpg"),
            Some("https://media.example.com/pp/a-1.jpg".to_string())
        );
    }
}
