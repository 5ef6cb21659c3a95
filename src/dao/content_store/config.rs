use super::error::{RestDaoError, RestResult};

/// Default bucket name used when none is configured.
const DEFAULT_BUCKET: &str = "game-content";
/// Default endpoint of the dedicated blob service.
const DEFAULT_BLOB_BASE_URL: &str = "https://blob.vercel-storage.com";

/// Runtime configuration describing how to reach the content store.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL of the store, without a trailing slash.
    pub base_url: String,
    /// API key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Object-storage bucket holding uploaded media.
    pub bucket: String,
    /// Write token for the dedicated blob service; preferred for uploads when set.
    pub blob_token: Option<String>,
    /// Endpoint of the dedicated blob service.
    pub blob_base_url: String,
}

impl RestStoreConfig {
    /// Construct a configuration from an explicit base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            bucket: DEFAULT_BUCKET.to_owned(),
            blob_token: None,
            blob_base_url: DEFAULT_BLOB_BASE_URL.to_owned(),
        }
    }

    /// Build a configuration by reading the expected environment variables.
    ///
    /// The service key takes precedence over the anonymous key; at least one
    /// must be present alongside the store URL.
    pub fn from_env() -> RestResult<Self> {
        let base_url =
            std::env::var("CONTENT_STORE_URL").map_err(|_| RestDaoError::MissingEnvVar {
                var: "CONTENT_STORE_URL",
            })?;
        let api_key = std::env::var("CONTENT_STORE_SERVICE_KEY")
            .or_else(|_| std::env::var("CONTENT_STORE_ANON_KEY"))
            .map_err(|_| RestDaoError::MissingEnvVar {
                var: "CONTENT_STORE_SERVICE_KEY",
            })?;

        let mut config = Self::new(base_url, api_key);

        if let Ok(bucket) = std::env::var("CONTENT_STORE_BUCKET") {
            config.bucket = bucket;
        }
        config.blob_token = std::env::var("BLOB_READ_WRITE_TOKEN").ok();
        if let Ok(blob_base_url) = std::env::var("BLOB_BASE_URL") {
            config.blob_base_url = blob_base_url;
        }

        Ok(config)
    }

    /// Whether the dedicated blob service should be used for uploads.
    pub fn blob_enabled(&self) -> bool {
        self.blob_token.is_some()
    }
}
