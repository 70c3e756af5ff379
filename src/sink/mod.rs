//! HTTP forwarding sink.
//!
//! [`ForwardingSink`] decodes each write as a JSON object, appends it to an
//! in-memory batch and `POST`s the whole batch as a JSON array to the
//! configured endpoint using HTTP Basic authentication.
//!
//! # Delivery semantics
//!
//! - **200**: the batch is cleared.
//! - **Any other status**: [`SinkError::UpstreamRejected`]; the batch is kept.
//! - **Network errors**: [`SinkError::Transport`]; the batch is kept.
//!
//! There is no retry loop. A kept batch is re-sent, together with any newer
//! records, on the next append or flush.

mod error;
mod handler;
mod transport;


pub use error::{SinkError, WriteError};
pub use handler::ForwardingSink;
