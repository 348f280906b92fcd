//! Transport configuration.
//!
//! Loaded from JSON. Only `base_url` is required:
//!
//! ```json
//! {
//!   "base_url": "http://localhost:8080",
//!   "timeout_ms": 5000,
//!   "headers": { "x-api-key": "secret" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::TransportError;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    concat!("catena/", env!("CARGO_PKG_VERSION")).to_owned()
}

/// Settings for [`crate::HttpDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Absolute `http` or `https` URL that request paths are appended to.
    pub base_url: String,

    /// Total time allowed for one request, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Time allowed to establish a connection, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl TransportConfig {
    /// Creates a configuration with default settings for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            user_agent: default_user_agent(),
            headers: BTreeMap::new(),
        }
    }

    /// Parses a configuration from JSON text. The result is not validated.
    pub fn from_json_str(json: &str) -> Result<Self, TransportError> {
        serde_json::from_str(json).map_err(|e| TransportError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Reads and parses a JSON configuration file. The result is not validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TransportError::InvalidConfig {
            message: format!("cannot read '{}': {e}", path.display()),
        })?;
        Self::from_json_str(&text)
    }

    /// Adds a default header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Checks every setting and returns the parsed base URL.
    pub fn validate(&self) -> Result<Url, TransportError> {
        let invalid = |message: String| TransportError::InvalidConfig { message };

        let url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "base_url '{}' must use http or https",
                self.base_url
            )));
        }
        if url.cannot_be_a_base() {
            return Err(invalid(format!("base_url '{}' cannot carry a path", self.base_url)));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms must be greater than zero".to_owned()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(invalid("connect_timeout_ms must be greater than zero".to_owned()));
        }
        HeaderValue::from_str(&self.user_agent).map_err(|_| {
            invalid(format!(
                "user_agent '{}' is not a valid header value",
                self.user_agent
            ))
        })?;
        self.header_map()?;

        Ok(url)
    }

    /// Total request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Default headers as a [`HeaderMap`].
    pub fn header_map(&self) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| TransportError::InvalidConfig {
                    message: format!("invalid header name '{name}'"),
                })?;
            let value = HeaderValue::from_str(value).map_err(|_| TransportError::InvalidConfig {
                message: format!("invalid value for header '{name}'"),
            })?;
            map.insert(header, value);
        }
        Ok(map)
    }
}
