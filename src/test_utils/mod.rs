//! Helpers shared by unit and integration tests.

pub mod mock_server;

pub use mock_server::{CapturedRequest, MockServer, unreachable_url};
