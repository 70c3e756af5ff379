//! Log sink forwarding JSON records to an OpenObserve ingestion endpoint.
//!
//! The logging facility hands the sink one serialised JSON object per write.
//! The sink queues it and immediately `POST`s every queued record as a JSON
//! array with HTTP Basic credentials. Records are only dropped from the
//! queue once the endpoint answers 200.

pub mod config;
pub mod record;
pub mod registry;
pub mod sink;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;
#[cfg(feature = "tracing-compat")]
pub mod tracing_writer;

pub use config::{ConfigError, Destination, SINK_SCHEME, SinkConfig, SinkConfigBuilder};
pub use record::Record;
pub use registry::{RegistryError, SinkFactory, SinkRegistry, open_sink};
pub use sink::{ForwardingSink, SinkError, WriteError};
#[cfg(feature = "tracing-compat")]
pub use tracing_writer::{SharedSink, json_layer};
