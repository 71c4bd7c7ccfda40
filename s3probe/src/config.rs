//! Probe configuration.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default per-operation timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection and behaviour settings for one probe run.
///
/// Supplied once at run start and never mutated by the pipeline.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Endpoint base URL. `None` uses the provider default.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key id.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Secret access key.
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,
    /// Region name.
    #[serde(default)]
    pub region: Option<String>,
    /// Bucket to exercise.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Per-operation timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Suppress mutating checks.
    #[serde(default)]
    pub read_only: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: None,
            secret_key: None,
            region: None,
            bucket: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_only: false,
        }
    }
}

/// Validated connection parameters borrowed from a [`ProbeConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Connection<'a> {
    /// Endpoint base URL.
    pub endpoint: Option<&'a str>,
    /// Access key id.
    pub access_key: &'a str,
    /// Secret access key.
    pub secret_key: &'a str,
    /// Region name.
    pub region: Option<&'a str>,
    /// Bucket name.
    pub bucket: &'a str,
}

impl ProbeConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the credential pair.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Sets the per-operation timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Enables or disables read-only mode.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Gets the timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Key identifying the monitored endpoint in run-scoped state.
    #[must_use]
    pub fn endpoint_key(&self) -> String {
        match (&self.endpoint, &self.bucket) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(bucket)) => format!("s3://{bucket}"),
            (None, None) => "default".to_string(),
        }
    }

    /// Checks that credentials and bucket are present.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] naming every missing parameter.
    pub fn connection(&self) -> Result<Connection<'_>, ConfigurationError> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        let access_key = present(&self.access_key);
        let secret_key = present(&self.secret_key);
        let bucket = present(&self.bucket);

        match (access_key, secret_key, bucket) {
            (Some(access_key), Some(secret_key), Some(bucket)) => Ok(Connection {
                endpoint: present(&self.endpoint),
                access_key,
                secret_key,
                region: present(&self.region),
                bucket,
            }),
            _ => {
                let mut missing = Vec::new();
                if access_key.is_none() {
                    missing.push("access key");
                }
                if secret_key.is_none() {
                    missing.push("secret key");
                }
                if bucket.is_none() {
                    missing.push("bucket");
                }
                Err(ConfigurationError::new(missing))
            }
        }
    }
}

impl fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("timeout_secs", &self.timeout_secs)
            .field("read_only", &self.read_only)
            .finish()
    }
}
