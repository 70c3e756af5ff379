//! Errors surfaced by the forwarding sink.

use std::io;

use thiserror::Error;

/// Failure modes of a sink operation.
///
/// Every variant is returned to the caller; the sink never logs and swallows
/// a failure and never retries on its own.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Input bytes were not a JSON object.
    #[error("unmarshal failed: {0}")]
    Decode(#[source] serde_json::Error),
    /// The pending batch could not be serialised.
    #[error("marshal failed: {0}")]
    Encode(#[source] serde_json::Error),
    /// The request could not be built or the network round trip failed.
    #[error("request failed: {0}")]
    Transport(#[source] Box<ureq::Transport>),
    /// The endpoint answered with a status other than 200.
    #[error("unexpected status code: {status}\nrequest url: {url}\nrequest body: {body}")]
    UpstreamRejected {
        status: u16,
        url: String,
        body: String,
    },
}

/// Failed write: the error plus the number of bytes the sink accepted.
///
/// `written` is the input length whenever the record was queued, even though
/// delivery failed, and zero when the input could not be decoded.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct WriteError {
    pub written: usize,
    pub source: SinkError,
}

impl WriteError {
    /// Borrow the underlying sink error.
    pub fn kind(&self) -> &SinkError {
        &self.source
    }

    /// Discard the byte count and keep the sink error.
    pub fn into_inner(self) -> SinkError {
        self.source
    }
}

impl From<SinkError> for io::Error {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Decode(_) => io::Error::new(io::ErrorKind::InvalidData, err),
            other => io::Error::other(other),
        }
    }
}
