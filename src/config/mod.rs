//! Configuration consumed by the forwarding sink.
//!
//! A [`SinkConfig`] is produced either by [`SinkConfigBuilder`] or by parsing
//! a registration URI with [`SinkConfig::from_uri`]. Both paths validate
//! eagerly so a sink can never be constructed with a missing endpoint or
//! credential.

use std::time::Duration;

use thiserror::Error;

mod builder;
mod uri;

pub use builder::SinkConfigBuilder;
pub use uri::SINK_SCHEME;

/// Errors raised while assembling a sink configuration.
///
/// Hosts are expected to treat every variant as fatal during startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The registration URI could not be parsed at all.
    #[error("invalid sink URI: {0}")]
    InvalidUri(String),
    /// The registration URI used a scheme other than the sink scheme.
    #[error("unsupported sink scheme {0:?}")]
    UnsupportedScheme(String),
    /// The registration URI carried no host.
    #[error("missing host")]
    MissingHost,
    /// A required query parameter was absent or empty.
    #[error("missing {0}")]
    MissingParameter(&'static str),
    /// The `proto` parameter named something other than `http` or `https`.
    #[error("unsupported proto {0:?}; expected http or https")]
    InvalidProto(String),
    /// Invalid user supplied configuration.
    #[error("invalid sink configuration: {0}")]
    InvalidConfig(String),
    /// The TLS backend could not be initialised.
    #[error("TLS initialisation failed: {0}")]
    Tls(String),
}

/// Ingestion endpoint and the static credentials used to reach it.
#[derive(Clone, PartialEq, Eq)]
pub struct Destination {
    url: String,
    username: String,
    password: String,
}

impl Destination {
    pub(crate) fn new(url: String, username: String, password: String) -> Self {
        Self {
            url,
            username,
            password,
        }
    }

    /// Target URL receiving the `POST` requests.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Username presented via HTTP Basic authentication.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Destination")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration object describing how to construct a
/// [`ForwardingSink`](crate::ForwardingSink).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Endpoint and credentials.
    pub destination: Destination,
    /// Timeout for establishing connections. `None` keeps the client default.
    pub connect_timeout: Option<Duration>,
    /// Overall request timeout. `None` keeps the client default.
    pub timeout: Option<Duration>,
}

impl SinkConfig {
    /// Start a builder with nothing configured.
    pub fn builder() -> SinkConfigBuilder {
        SinkConfigBuilder::new()
    }

    /// Parse a registration URI of the form
    /// `oo://host/path?proto=https&username=u&password=p`.
    ///
    /// The destination URL becomes `<proto>://<host><path>`.
    pub fn from_uri(uri: &str) -> Result<Self, ConfigError> {
        uri::parse(uri)
    }
}
