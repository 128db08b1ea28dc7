use std::path::PathBuf;

/// Connection settings for an S3-compatible bucket.
#[derive(Clone)]
pub struct SpacesConfig {
    pub bucket: String,
    pub region: String,
    /// Endpoint URL, e.g. `https://nyc3.digitaloceanspaces.com`.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for SpacesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpacesConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Which object store backs screenshot uploads.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Spaces(SpacesConfig),
    Local { root: PathBuf },
    Memory,
}

/// Object storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// First segment of every screenshot key, e.g. `production`.
    pub base_folder: String,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                          |
    /// |-----------------------|----------------------------------|
    /// | `STORAGE_BACKEND`     | `local` (`spaces`, `local`, `memory`) |
    /// | `STORAGE_BASE_FOLDER` | `development`                    |
    /// | `LOCAL_STORAGE_PATH`  | `./storage`                      |
    /// | `SPACES_BUCKET`       | required for `spaces`            |
    /// | `SPACES_REGION`       | `nyc3`                           |
    /// | `SPACES_ENDPOINT`     | `https://{region}.digitaloceanspaces.com` |
    /// | `SPACES_KEY`          | required for `spaces`            |
    /// | `SPACES_SECRET`       | required for `spaces`            |
    pub fn from_env() -> Self {
        let base_folder =
            std::env::var("STORAGE_BASE_FOLDER").unwrap_or_else(|_| "development".into());

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "spaces" => StorageBackend::Spaces(SpacesConfig::from_env()),
            "memory" => StorageBackend::Memory,
            "local" => StorageBackend::Local {
                root: std::env::var("LOCAL_STORAGE_PATH")
                    .unwrap_or_else(|_| "./storage".into())
                    .into(),
            },
            other => panic!("STORAGE_BACKEND must be one of spaces, local, memory (got {other})"),
        };

        Self {
            backend,
            base_folder,
        }
    }

    /// In-memory configuration for tests.
    pub fn memory(base_folder: impl Into<String>) -> Self {
        Self {
            backend: StorageBackend::Memory,
            base_folder: base_folder.into(),
        }
    }
}

impl SpacesConfig {
    fn from_env() -> Self {
        let region = std::env::var("SPACES_REGION").unwrap_or_else(|_| "nyc3".into());
        let endpoint = std::env::var("SPACES_ENDPOINT")
            .unwrap_or_else(|_| format!("https://{region}.digitaloceanspaces.com"));

        Self {
            bucket: std::env::var("SPACES_BUCKET").expect("SPACES_BUCKET must be set"),
            region,
            endpoint,
            access_key: std::env::var("SPACES_KEY").expect("SPACES_KEY must be set"),
            secret_key: std::env::var("SPACES_SECRET").expect("SPACES_SECRET must be set"),
        }
    }
}
