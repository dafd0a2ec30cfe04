//! Fake update API server for test runs.
//!
//! The server stands in for the remote update API while a client under test
//! runs. Every call is decoded, appended to the observed sequence and, when
//! expectations were supplied, checked against the next expectation in order.
//! Problems never abort the run: they are collected and reported together.
//!
//! # Example
//!
//! ```no_run
//! use fakeapi::mock_server::{Fixtures, MockServer};
//!
//! # async fn example() -> fakeapi::Result<()> {
//! let expected = Fixtures::expectations(&[Fixtures::mark_as_processed("abc123")]);
//! let mut server = MockServer::start(expected).await?;
//!
//! // Run the client under test against server.url() ...
//!
//! server.stop().await;
//! server.complete().await;
//! assert!(server.report().await.passed());
//! # Ok(())
//! # }
//! ```

mod fixtures;
mod handlers;
mod matcher;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use handlers::HandlerState;
pub use matcher::ExpectationCursor;
pub use server::MockServer;
pub use state::{RunState, SharedRunState};
