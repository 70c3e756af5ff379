//! Send/Sync guarantees for core types.

use openobserve_sink::{
    ConfigError, Destination, ForwardingSink, Record, SinkConfig, SinkConfigBuilder, SinkError,
    SinkRegistry,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn configuration_is_send_sync() {
    assert_impl_all!(SinkConfigBuilder: Send, Sync);
    assert_impl_all!(SinkConfig: Send, Sync);
    assert_impl_all!(Destination: Send, Sync);
    assert_impl_all!(SinkRegistry: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(ForwardingSink: Send, Sync);
    assert_impl_all!(Record: Send, Sync);
}

#[rstest]
fn errors_are_std_errors() {
    assert_impl_all!(SinkError: std::error::Error, Send, Sync);
    assert_impl_all!(ConfigError: std::error::Error, Send, Sync);
}
