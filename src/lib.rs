//! Fake update API for end-to-end test runs.
//!
//! An update job reports its progress by calling a remote API: the
//! dependencies it found, the pull requests it wants to open, update or close,
//! and finally the commit it processed. This crate provides a local stand-in
//! for that API which records every call and optionally verifies the calls
//! against an ordered list of expectations loaded from a scenario file.
//!
//! # Quick Start
//!
//! ```no_run
//! use fakeapi::{MockServer, Scenario};
//!
//! #[tokio::main]
//! async fn main() -> fakeapi::Result<()> {
//!     let scenario = Scenario::load("scenario.yaml")?;
//!     let mut server = MockServer::start(scenario.output.clone()).await?;
//!
//!     // Point the job at server.url() and wait for it to exit ...
//!
//!     server.stop().await;
//!     server.complete().await;
//!
//!     for err in server.errors().await {
//!         eprintln!("{err}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modes
//!
//! - With expectations, each call consumes one expectation in order and any
//!   difference is recorded as an error. Unconsumed expectations are reported
//!   by [`MockServer::complete`].
//! - Without expectations (update mode), calls are only recorded, and
//!   [`Scenario::from_run`] turns them into a fresh expectation list.
//!
//! # Configuration
//!
//! - `FAKE_API_HOST` (optional) - Bind host (defaults to `127.0.0.1`, or
//!   `0.0.0.0` on Linux)

pub mod cli;
mod compare;
mod config;
mod error;
pub mod mock_server;
mod models;
mod output;

pub use compare::compare;
pub use config::{default_host, ServerConfig, HOST_ENV_VAR};
pub use error::{DecodeError, FakeApiError, MismatchError, RecordedError, Result};
pub use mock_server::MockServer;
pub use output::{PrettyPrint, RunReport};

// Re-export models
pub use models::{
    // Events
    ClosePullRequest,
    CreatePullRequest,
    Event,
    EventKind,
    MarkAsProcessed,
    RecordPackageManagerVersion,
    RecordUpdateJobError,
    UpdateDependencyList,
    UpdatePullRequest,
    // Shared payload types
    Dependency,
    DependencyFile,
    Requirement,
    // Runs and scenarios
    Expectation,
    Job,
    ObservedCall,
    Scenario,
    ScenarioInput,
    Source,
};
