use std::path::Path;
use std::time::Duration;

use archive_protocol::{ArchiveError, ArchiveResult, Endpoints, Operation, DEFAULT_BUFFER_CAPACITY};
use archive_types::Uri;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROVIDER_BASE: &str = "maltcp://127.0.0.1:12400";
pub const DEFAULT_CONSUMER_URI: &str = "maltcp://127.0.0.1:14200";
pub const DEFAULT_SERVING_PERIOD_SECS: u64 = 120;

/// Addressing and limits of an archive service process.
///
/// Resolved once at startup and shared read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URI every provider endpoint lives under.
    pub provider_base: Uri,
    pub consumer_uri: Uri,
    /// How long a launched provider keeps its listener open.
    pub serving_period_secs: u64,
    /// Initial capacity of payload encode buffers.
    pub buffer_capacity: usize,
    pub endpoints: Endpoints,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider_base: Uri::new(DEFAULT_PROVIDER_BASE),
            consumer_uri: Uri::new(DEFAULT_CONSUMER_URI),
            serving_period_secs: DEFAULT_SERVING_PERIOD_SECS,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            endpoints: Endpoints::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(s: &str) -> ArchiveResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ArchiveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ArchiveError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ArchiveResult<String> {
        toml::to_string_pretty(self).map_err(|e| ArchiveError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ArchiveResult<()> {
        for (name, uri) in [("provider_base", &self.provider_base), ("consumer_uri", &self.consumer_uri)] {
            Uri::parse(uri.as_str()).map_err(|e| ArchiveError::Config(format!("{name}: {e}")))?;
        }
        if self.provider_base.endpoint_name().is_some() {
            return Err(ArchiveError::Config(format!(
                "provider_base must not carry an endpoint name: {}",
                self.provider_base
            )));
        }
        if self.serving_period_secs == 0 {
            return Err(ArchiveError::Config("serving_period_secs must be positive".into()));
        }
        if self.buffer_capacity == 0 {
            return Err(ArchiveError::Config("buffer_capacity must be positive".into()));
        }
        self.endpoints.validate()
    }

    /// Address of the provider endpoint serving `operation`.
    pub fn endpoint_uri(&self, operation: Operation) -> Uri {
        self.endpoints.resolve(&self.provider_base, operation)
    }

    pub fn serving_period(&self) -> Duration {
        Duration::from_secs(self.serving_period_secs)
    }
}
