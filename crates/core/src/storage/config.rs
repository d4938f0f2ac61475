//! Storage provider resolution.

use std::path::PathBuf;

use mugshot_shared::config::StorageSettings;
use tracing::{info, warn};

/// Which storage backend is active. Resolved once at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Local filesystem backend.
    Local,
    /// Remote object-store backend.
    Remote,
}

impl StorageMode {
    /// Lowercase mode name for logs and status responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible remote store: Cloudflare R2, Supabase, AWS S3.
    Remote {
        /// Endpoint URL. Falls back to the provider default when absent.
        endpoint: Option<String>,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Local filesystem.
    Local {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Resolves the provider from configuration, exactly once at startup.
    ///
    /// The remote backend is selected only when the complete credential set
    /// is present. A partial set is treated as "not configured": the gaps
    /// are logged and the local filesystem backend is used instead.
    #[must_use]
    pub fn resolve(settings: &StorageSettings) -> Self {
        let missing: Vec<&str> = [
            ("bucket", settings.bucket.is_some()),
            ("access_key_id", settings.access_key_id.is_some()),
            ("secret_access_key", settings.secret_access_key.is_some()),
            ("region", settings.region.is_some()),
        ]
        .iter()
        .filter_map(|&(name, present)| (!present).then_some(name))
        .collect();

        if missing.is_empty() {
            return Self::Remote {
                endpoint: settings.endpoint.clone(),
                bucket: settings.bucket.clone().unwrap_or_default(),
                access_key_id: settings.access_key_id.clone().unwrap_or_default(),
                secret_access_key: settings.secret_access_key.clone().unwrap_or_default(),
                region: settings.region.clone().unwrap_or_default(),
            };
        }

        if missing.len() < 4 {
            warn!(
                missing = missing.join(", "),
                "partial remote storage configuration, falling back to local storage"
            );
        } else {
            info!("remote storage not configured, using local file storage");
        }

        Self::Local {
            root: settings.local_root.clone(),
        }
    }

    /// Returns the mode this provider operates in.
    #[must_use]
    pub const fn mode(&self) -> StorageMode {
        match self {
            Self::Remote { .. } => StorageMode::Remote,
            Self::Local { .. } => StorageMode::Local,
        }
    }

    /// Create a local filesystem provider.
    #[must_use]
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::Local { root: root.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(
        bucket: Option<&str>,
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
        region: Option<&str>,
    ) -> StorageSettings {
        StorageSettings {
            media_base_url: "https://media.example.com".to_string(),
            local_root: PathBuf::from("./uploads"),
            endpoint: None,
            bucket: bucket.map(String::from),
            access_key_id: access_key_id.map(String::from),
            secret_access_key: secret_access_key.map(String::from),
            region: region.map(String::from),
        }
    }

    #[rstest::rstest]
    #[case::full(Some("media"), Some("key"), Some("secret"), Some("auto"), StorageMode::Remote)]
    #[case::missing_secret(Some("media"), Some("key"), None, Some("auto"), StorageMode::Local)]
    #[case::missing_region(Some("media"), Some("key"), Some("secret"), None, StorageMode::Local)]
    #[case::only_bucket(Some("media"), None, None, None, StorageMode::Local)]
    #[case::none(None, None, None, None, StorageMode::Local)]
    fn test_resolve_requires_complete_credentials(
        #[case] bucket: Option<&str>,
        #[case] access_key_id: Option<&str>,
        #[case] secret_access_key: Option<&str>,
        #[case] region: Option<&str>,
        #[case] expected: StorageMode,
    ) {
        let provider = StorageProvider::resolve(&settings(
            bucket,
            access_key_id,
            secret_access_key,
            region,
        ));
        assert_eq!(provider.mode(), expected);
    }

    #[test]
    fn test_resolve_no_credentials_uses_configured_root() {
        let provider = StorageProvider::resolve(&settings(None, None, None, None));
        if let StorageProvider::Local { root } = provider {
            assert_eq!(root, PathBuf::from("./uploads"));
        } else {
            panic!("expected local provider");
        }
    }

    #[test]
    fn test_endpoint_alone_does_not_enable_remote() {
        let mut s = settings(None, None, None, None);
        s.endpoint = Some("https://account.r2.cloudflarestorage.com".to_string());
        assert_eq!(StorageProvider::resolve(&s).mode(), StorageMode::Local);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(StorageMode::Local.to_string(), "local");
        assert_eq!(StorageMode::Remote.to_string(), "remote");
    }
}
