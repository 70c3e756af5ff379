//! Builder for [`SinkConfig`].

use std::time::Duration;

use url::Url;

use super::{ConfigError, Destination, SinkConfig};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing validated [`SinkConfig`] values.
#[derive(Clone, Default)]
pub struct SinkConfigBuilder {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    connect_timeout_ms: Option<u64>,
    timeout_ms: Option<u64>,
}

impl SinkConfigBuilder {
    /// Create a new builder with no URL or credentials configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ingestion URL (required).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Configure HTTP Basic authentication (required).
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the overall request timeout in milliseconds."]
        with_timeout_ms,
        timeout_ms,
        u64
    );

    fn validate_url(&self) -> Result<String, ConfigError> {
        let url = match &self.url {
            None => return Err(ConfigError::MissingParameter("url")),
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::MissingParameter("url"));
            }
            Some(url) => url,
        };
        let parsed = Url::parse(url).map_err(|err| ConfigError::InvalidUri(err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::InvalidProto(other.to_owned())),
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingHost);
        }
        Ok(url.clone())
    }

    fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
        match value {
            Some(v) if !v.is_empty() => Ok(v.clone()),
            _ => Err(ConfigError::MissingParameter(name)),
        }
    }

    fn timeout(value: Option<u64>, field: &str) -> Result<Option<Duration>, ConfigError> {
        value
            .map(|ms| ensure_positive!(ms, field).map(Duration::from_millis))
            .transpose()
    }

    /// Validate the collected settings and produce a [`SinkConfig`].
    pub fn build(&self) -> Result<SinkConfig, ConfigError> {
        let url = self.validate_url()?;
        let username = Self::required(&self.username, "username")?;
        let password = Self::required(&self.password, "password")?;
        Ok(SinkConfig {
            destination: Destination::new(url, username, password),
            connect_timeout: Self::timeout(self.connect_timeout_ms, "connect_timeout_ms")?,
            timeout: Self::timeout(self.timeout_ms, "timeout_ms")?,
        })
    }
}

impl std::fmt::Debug for SinkConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkConfigBuilder")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}
