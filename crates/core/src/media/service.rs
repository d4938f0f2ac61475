//! Profile image ingestion service.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::encoder::SizeBoundedEncoder;
use super::error::MediaError;
use super::key::generate_key;
use crate::storage::StorageService;

/// Content type of every stored profile image.
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Declared content types accepted for upload.
const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Record-store seam for the current profile image key.
///
/// Implemented by the db crate against the users table; tests use an
/// in-memory implementation.
pub trait ProfileImageRecords: Send + Sync {
    /// Returns the owner's current image key, if any.
    fn current_key(
        &self,
        owner_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<String>, MediaError>> + Send;

    /// Points the owner's record at a new image key.
    fn set_current_key(
        &self,
        owner_id: Uuid,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), MediaError>> + Send;
}

/// Orchestrates profile image ingestion: validate, encode, persist, update
/// the record, retire the previous image.
pub struct ProfileImageService<R: ProfileImageRecords> {
    storage: Arc<StorageService>,
    records: Arc<R>,
    encoder: SizeBoundedEncoder,
}

impl<R: ProfileImageRecords> ProfileImageService<R> {
    /// Creates the ingestion service.
    #[must_use]
    pub fn new(storage: Arc<StorageService>, records: Arc<R>, encoder: SizeBoundedEncoder) -> Self {
        Self {
            storage,
            records,
            encoder,
        }
    }

    /// Ingests a raw upload and returns the new object key.
    ///
    /// The previous key is read before any mutation. Encoding or storage
    /// failures abort with no state change. Once the record points at the
    /// new key, failure to delete the previous object is logged and
    /// swallowed: the record is already correct and the leftover object is
    /// merely an orphan.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Validation` for empty payloads or content
    /// types outside the JPEG/PNG allow-list, `MediaError::Decode` /
    /// `MediaError::Encoding` from the encoder, `MediaError::Storage` if
    /// the write fails, and `MediaError::Record` if the record store
    /// fails.
    pub async fn ingest(
        &self,
        owner_id: Uuid,
        owner_label: &str,
        raw: &[u8],
        content_type: &str,
    ) -> Result<String, MediaError> {
        if raw.is_empty() {
            return Err(MediaError::validation("no image payload provided"));
        }
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(MediaError::validation(format!(
                "unsupported content type: {content_type}"
            )));
        }

        let previous = self.records.current_key(owner_id).await?;

        let encoded = self.encoder.encode(raw)?;
        let size = encoded.bytes.len();

        let key = generate_key(owner_label);
        self.storage
            .put(&key, encoded.bytes, IMAGE_CONTENT_TYPE)
            .await?;

        self.records.set_current_key(owner_id, &key).await?;

        info!(
            owner_id = %owner_id,
            key = %key,
            quality = encoded.quality,
            width = encoded.width,
            size,
            "profile image ingested"
        );

        if let Some(old_key) = previous {
            // A suffix collision could hand back the key we just wrote;
            // deleting it would retire the current image.
            if old_key != key {
                if let Err(e) = self.storage.delete(&old_key).await {
                    warn!(
                        owner_id = %owner_id,
                        key = %old_key,
                        error = %e,
                        "failed to delete previous profile image"
                    );
                }
            }
        }

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::encoder::SIZE_CEILING;
    use crate::storage::StorageProvider;
    use image::{Rgb, RgbImage, codecs::jpeg::JpegEncoder};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory record store. `fail_updates` makes every call error, to
    /// exercise the no-side-effect paths.
    #[derive(Default)]
    struct MemoryRecords {
        keys: Mutex<HashMap<Uuid, String>>,
        fail_updates: bool,
    }

    impl MemoryRecords {
        fn key_of(&self, owner_id: Uuid) -> Option<String> {
            self.keys.lock().unwrap().get(&owner_id).cloned()
        }

        fn preset(&self, owner_id: Uuid, key: &str) {
            self.keys.lock().unwrap().insert(owner_id, key.to_string());
        }
    }

    impl ProfileImageRecords for MemoryRecords {
        async fn current_key(&self, owner_id: Uuid) -> Result<Option<String>, MediaError> {
            if self.fail_updates {
                return Err(MediaError::record("record store down"));
            }
            Ok(self.key_of(owner_id))
        }

        async fn set_current_key(&self, owner_id: Uuid, key: &str) -> Result<(), MediaError> {
            if self.fail_updates {
                return Err(MediaError::record("record store down"));
            }
            self.preset(owner_id, key);
            Ok(())
        }
    }

    fn service(
        root: &std::path::Path,
        records: Arc<MemoryRecords>,
    ) -> ProfileImageService<MemoryRecords> {
        let storage = Arc::new(
            StorageService::from_provider(
                StorageProvider::local(root),
                "https://media.example.com",
            )
            .unwrap(),
        );
        ProfileImageService::new(storage, records, SizeBoundedEncoder::default())
    }

    fn sample_jpeg() -> Vec<u8> {
        let img = RgbImage::from_pixel(400, 400, Rgb([12, 120, 200]));
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, 90);
        encoder
            .encode(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgb8,
            )
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_ingest_stores_object_and_updates_record() {
        let dir = tempfile::tempdir().unwrap();
        let records = Arc::new(MemoryRecords::default());
        let service = service(dir.path(), Arc::clone(&records));
        let owner = Uuid::new_v4();

        let key = service
            .ingest(owner, "Alice Example", &sample_jpeg(), "image/jpeg")
            .await
            .unwrap();

        assert!(key.starts_with("pp/aliceexample-"));
        assert_eq!(records.key_of(owner), Some(key.clone()));

        let stored = service.storage.get(&key).await.unwrap();
        assert!(stored.len() <= SIZE_CEILING);
    }

    #[tokio::test]
    async fn test_ingest_retires_previous_object() {
        let dir = tempfile::tempdir().unwrap();
        let records = Arc::new(MemoryRecords::default());
        let service = service(dir.path(), Arc::clone(&records));
        let owner = Uuid::new_v4();

        let first = service
            .ingest(owner, "alice", &sample_jpeg(), "image/jpeg")
            .await
            .unwrap();
        let second = service
            .ingest(owner, "alice", &sample_jpeg(), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(records.key_of(owner), Some(second.clone()));
        if first != second {
            assert!(!service.storage.exists(&first).await);
        }
        assert!(service.storage.exists(&second).await);
    }

    #[tokio::test]
    async fn test_ingest_with_missing_previous_object_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let records = Arc::new(MemoryRecords::default());
        records.preset(Uuid::nil(), "pp/ghost-1.jpg");
        let service = service(dir.path(), Arc::clone(&records));

        // The recorded previous key has no stored object behind it; the
        // cleanup is a no-op rather than a failure.
        let key = service
            .ingest(Uuid::nil(), "alice", &sample_jpeg(), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(records.key_of(Uuid::nil()), Some(key));
    }

    #[tokio::test]
    async fn test_empty_payload_rejected_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let records = Arc::new(MemoryRecords {
            fail_updates: true,
            ..MemoryRecords::default()
        });
        let service = service(dir.path(), Arc::clone(&records));

        // Validation fires before the record store is consulted, so the
        // poisoned store is never reached.
        let err = service
            .ingest(Uuid::new_v4(), "alice", &[], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unsupported_content_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let records = Arc::new(MemoryRecords::default());
        let service = service(dir.path(), Arc::clone(&records));

        let err = service
            .ingest(Uuid::new_v4(), "alice", &sample_jpeg(), "image/gif")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));
    }

    #[tokio::test]
    async fn test_undecodable_payload_leaves_record_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let records = Arc::new(MemoryRecords::default());
        records.preset(Uuid::nil(), "pp/before-1.jpg");
        let service = service(dir.path(), Arc::clone(&records));

        let err = service
            .ingest(Uuid::nil(), "alice", b"not an image", "image/jpeg")
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Decode(_)));
        assert_eq!(records.key_of(Uuid::nil()), Some("pp/before-1.jpg".into()));
    }

    #[tokio::test]
    async fn test_concurrent_ingests_leave_one_authoritative_key() {
        let dir = tempfile::tempdir().unwrap();
        let records = Arc::new(MemoryRecords::default());
        let service = Arc::new(service(dir.path(), Arc::clone(&records)));
        let owner = Uuid::new_v4();

        let payload = sample_jpeg();
        let (a, b) = tokio::join!(
            {
                let service = Arc::clone(&service);
                let payload = payload.clone();
                async move { service.ingest(owner, "alice", &payload, "image/jpeg").await }
            },
            {
                let service = Arc::clone(&service);
                let payload = payload.clone();
                async move { service.ingest(owner, "alice", &payload, "image/jpeg").await }
            }
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        let current = records.key_of(owner).unwrap();

        // Last record update wins; the record points at one of the two
        // keys and that object is readable.
        assert!(current == a || current == b);
        assert!(service.storage.exists(&current).await);
    }
}
