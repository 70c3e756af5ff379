//! Bridge from `tracing-subscriber`'s JSON formatter into the sink.
//!
//! `tracing_subscriber` implements `MakeWriter` for `Arc<W>` whenever `&W`
//! is an [`std::io::Write`], so a shared [`ForwardingSink`] can be handed
//! straight to a formatting layer. [`json_layer`] wires up the JSON format
//! with event fields flattened to the top level, one object per event.
//!
//! Events emitted by the delivery path itself (this crate, `ureq`,
//! `native_tls`) are filtered out. Forwarding them would make every flush
//! produce another record to flush.

use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::{Layer, filter::filter_fn, registry::LookupSpan};

use crate::sink::ForwardingSink;

/// Sink shared between the subscriber and the host's shutdown path.
pub type SharedSink = Arc<ForwardingSink>;

/// Target prefixes whose events never reach the sink.
const DELIVERY_TARGETS: &[&str] = &[env!("CARGO_CRATE_NAME"), "ureq", "native_tls"];

fn is_delivery_target(target: &str) -> bool {
    DELIVERY_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Build a JSON formatting layer writing every event through `sink`.
///
/// Keep a clone of `sink` and call [`ForwardingSink::close`] on shutdown.
pub fn json_layer<S>(sink: SharedSink) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_ansi(false)
        .with_writer(sink)
        .with_filter(filter_fn(|metadata| !is_delivery_target(metadata.target())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkConfigBuilder;
    use crate::test_utils::MockServer;
    use rstest::rstest;
    use tracing_subscriber::layer::SubscriberExt;

    #[rstest]
    #[case("openobserve_sink", true)]
    #[case("openobserve_sink::sink::handler", true)]
    #[case("ureq::unit", true)]
    #[case("native_tls", true)]
    #[case("ureq_extra", false)]
    #[case("app::http", false)]
    fn delivery_targets_are_recognised(#[case] target: &str, #[case] expected: bool) {
        assert_eq!(is_delivery_target(target), expected);
    }

    #[rstest]
    fn delivery_events_are_not_forwarded() {
        let server = MockServer::start(vec![200]);
        let config = SinkConfigBuilder::new()
            .with_url(server.url("/api/default/app/_json"))
            .with_basic_auth("u", "p")
            .build()
            .expect("valid config");
        let sink: SharedSink = Arc::new(ForwardingSink::new(config).expect("sink"));

        let subscriber = tracing_subscriber::registry().with(json_layer(Arc::clone(&sink)));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "ureq::unit", "sending request");
            tracing::debug!(target: "openobserve_sink::sink::handler", "delivered");
        });

        server.expect_silence(std::time::Duration::from_millis(200));
        assert_eq!(sink.pending_len(), 0);
    }

    #[rstest]
    fn events_arrive_as_flattened_json_objects() {
        let server = MockServer::start(vec![200]);
        let config = SinkConfigBuilder::new()
            .with_url(server.url("/api/default/app/_json"))
            .with_basic_auth("u", "p")
            .build()
            .expect("valid config");
        let sink: SharedSink = Arc::new(ForwardingSink::new(config).expect("sink"));

        let subscriber = tracing_subscriber::registry().with(json_layer(Arc::clone(&sink)));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user = "alice", "signed in");
        });

        let body = server.expect_request().json();
        let event = &body.as_array().expect("array body")[0];
        assert_eq!(event["message"], "signed in");
        assert_eq!(event["user"], "alice");
        assert_eq!(event["level"], "INFO");
        assert_eq!(sink.pending_len(), 0);
    }
}
