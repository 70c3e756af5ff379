//! Blocking HTTP delivery of serialised batches.
//!
//! A single `ureq::Agent` is kept per sink so connections can be reused
//! between flushes. Nothing here retries; each call maps to one request.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use ureq::{Agent, AgentBuilder};

use crate::config::{ConfigError, Destination, SinkConfig};

use super::error::SinkError;

/// Outcome of one delivery attempt that reached the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Exactly HTTP 200.
    Accepted,
    /// Any other status code.
    Rejected(u16),
}

/// Maps a status code to a delivery outcome. Only 200 counts as success.
pub(crate) fn classify_status(status: u16) -> Delivery {
    match status {
        200 => Delivery::Accepted,
        other => Delivery::Rejected(other),
    }
}

/// Base64-encode a byte slice for Basic auth.
fn base64_encode(input: &[u8]) -> String {
    BASE64_STANDARD.encode(input)
}

fn basic_auth_header(destination: &Destination) -> String {
    let credentials = format!("{}:{}", destination.username(), destination.password());
    format!("Basic {}", base64_encode(credentials.as_bytes()))
}

pub(crate) struct HttpTransport {
    agent: Agent,
    authorization: String,
}

impl HttpTransport {
    pub(crate) fn new(config: &SinkConfig) -> Result<Self, ConfigError> {
        let tls = native_tls::TlsConnector::new().map_err(|err| ConfigError::Tls(err.to_string()))?;
        let mut builder = AgentBuilder::new().tls_connector(Arc::new(tls));
        if let Some(timeout) = config.connect_timeout {
            builder = builder.timeout_connect(timeout);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            agent: builder.build(),
            authorization: basic_auth_header(&config.destination),
        })
    }

    /// Send `body` to `url` as JSON and report how the endpoint answered.
    pub(crate) fn post_json(&self, url: &str, body: &str) -> Result<Delivery, SinkError> {
        let result = self
            .agent
            .post(url)
            .set("Authorization", &self.authorization)
            .set("Content-Type", "application/json")
            .send_string(body);

        match result {
            Ok(response) => Ok(classify_status(response.status())),
            Err(ureq::Error::Status(code, _)) => Ok(classify_status(code)),
            Err(ureq::Error::Transport(err)) => Err(SinkError::Transport(Box::new(err))),
        }
    }
}
