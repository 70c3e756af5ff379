//! Explicit sink construction by URI scheme.
//!
//! Hosts build a [`SinkRegistry`] during setup, optionally add their own
//! schemes, and open sinks from registration URIs. Nothing is registered
//! behind the caller's back; a failed lookup or configuration is returned so
//! the host can abort startup.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, SINK_SCHEME, SinkConfig};
use crate::sink::ForwardingSink;

/// Constructor invoked for URIs carrying a registered scheme.
pub type SinkFactory = fn(&str) -> Result<ForwardingSink, ConfigError>;

/// Errors raised while registering or opening sinks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A factory already exists for the scheme.
    #[error("sink scheme {0:?} already registered")]
    AlreadyRegistered(String),
    /// No factory exists for the scheme in the URI.
    #[error("no sink registered for scheme {0:?}")]
    UnknownScheme(String),
    /// The factory rejected the URI.
    #[error("sink initialisation failed: {0}")]
    Config(#[from] ConfigError),
}

/// Build a [`ForwardingSink`] from a typed configuration.
pub fn open_sink(config: SinkConfig) -> Result<ForwardingSink, ConfigError> {
    ForwardingSink::new(config)
}

fn open_from_uri(uri: &str) -> Result<ForwardingSink, ConfigError> {
    open_sink(SinkConfig::from_uri(uri)?)
}

/// Scheme to factory lookup owned by the host application.
pub struct SinkRegistry {
    factories: HashMap<String, SinkFactory>,
}

impl SinkRegistry {
    /// Create a registry with the OpenObserve sink under [`SINK_SCHEME`].
    pub fn new() -> Self {
        let mut factories: HashMap<String, SinkFactory> = HashMap::new();
        factories.insert(SINK_SCHEME.to_owned(), open_from_uri);
        Self { factories }
    }

    /// Create a registry with no schemes.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` for `scheme`. Duplicate schemes are rejected.
    pub fn register(
        &mut self,
        scheme: impl Into<String>,
        factory: SinkFactory,
    ) -> Result<(), RegistryError> {
        let scheme = scheme.into().to_ascii_lowercase();
        if self.factories.contains_key(&scheme) {
            return Err(RegistryError::AlreadyRegistered(scheme));
        }
        self.factories.insert(scheme, factory);
        Ok(())
    }

    /// Whether a factory exists for `scheme`.
    pub fn contains(&self, scheme: &str) -> bool {
        self.factories.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Construct a sink from a registration URI.
    pub fn open(&self, uri: &str) -> Result<ForwardingSink, RegistryError> {
        let parsed = Url::parse(uri).map_err(|err| ConfigError::InvalidUri(err.to_string()))?;
        let factory = self
            .factories
            .get(parsed.scheme())
            .ok_or_else(|| RegistryError::UnknownScheme(parsed.scheme().to_owned()))?;
        Ok(factory(uri)?)
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut schemes: Vec<_> = self.factories.keys().collect();
        schemes.sort();
        f.debug_struct("SinkRegistry")
            .field("schemes", &schemes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn always_missing(_: &str) -> Result<ForwardingSink, ConfigError> {
        Err(ConfigError::MissingParameter("anything"))
    }

    #[rstest]
    fn default_registry_knows_sink_scheme() {
        let registry = SinkRegistry::default();
        assert!(registry.contains("oo"));
        assert!(registry.contains("OO"));
        assert!(!registry.contains("http"));
    }

    #[rstest]
    fn opens_sink_from_uri() {
        let sink = SinkRegistry::new()
            .open("oo://localhost:5080/api/default/app/_json?proto=http&username=u&password=p")
            .expect("sink");
        assert_eq!(sink.destination().url(), "http://localhost:5080/api/default/app/_json");
        assert_eq!(sink.pending_len(), 0);
    }

    #[rstest]
    fn missing_password_fails_before_any_sink_exists() {
        let err = SinkRegistry::new()
            .open("oo://localhost:5080/api/default/app/_json?proto=http&username=u")
            .expect_err("must fail");
        assert_eq!(
            err,
            RegistryError::Config(ConfigError::MissingParameter("password"))
        );
    }

    #[rstest]
    fn unknown_scheme_is_rejected() {
        let err = SinkRegistry::empty()
            .open("oo://h/p?proto=http&username=u&password=p")
            .expect_err("must fail");
        assert_eq!(err, RegistryError::UnknownScheme("oo".into()));
    }

    #[rstest]
    fn duplicate_registration_is_rejected() {
        let mut registry = SinkRegistry::new();
        let err = registry
            .register("oo", always_missing)
            .expect_err("duplicate");
        assert_eq!(err, RegistryError::AlreadyRegistered("oo".into()));
    }

    #[rstest]
    fn custom_factory_is_invoked() {
        let mut registry = SinkRegistry::empty();
        registry.register("mem", always_missing).expect("register");
        let err = registry.open("mem://anywhere").expect_err("factory fails");
        assert_eq!(
            err,
            RegistryError::Config(ConfigError::MissingParameter("anything"))
        );
    }
}
