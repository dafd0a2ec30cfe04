//! Fake update API server.
//!
//! Provides an axum-based HTTP server that records every update call.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::timeout::TimeoutLayer;

use super::handlers::{self, HandlerState};
use super::state::{RunState, SharedRunState};
use crate::config::ServerConfig;
use crate::error::{FakeApiError, RecordedError, Result};
use crate::models::{Expectation, ObservedCall};
use crate::output::RunReport;

/// A fake update API server for test runs.
///
/// The server runs in the background. Point the client under test at
/// [`MockServer::url`], wait for it to exit, then call
/// [`MockServer::complete`] and read the results.
pub struct MockServer {
    /// Bound listener address.
    addr: SocketAddr,
    /// Host the server was bound to, as configured.
    host: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Sends the graceful shutdown signal; taken on the first `stop`.
    shutdown: Option<oneshot::Sender<()>>,
    shutdown_grace: Duration,
    /// Shared run state.
    state: SharedRunState,
}

impl MockServer {
    /// Start a server configured from the environment.
    ///
    /// An empty expectation list starts the server in update mode, where calls
    /// are recorded but never checked.
    ///
    /// # Errors
    ///
    /// Returns [`FakeApiError::Bind`] if the listener cannot be bound. There is
    /// no way to run without a listener, so callers should treat it as fatal.
    pub async fn start(expectations: Vec<Expectation>) -> Result<Self> {
        Self::with_config(ServerConfig::from_env(), expectations).await
    }

    /// Start a server with explicit configuration.
    pub async fn with_config(config: ServerConfig, expectations: Vec<Expectation>) -> Result<Self> {
        let state = RunState::new(expectations).shared();
        let app = Self::create_router(
            HandlerState {
                run: state.clone(),
                body_read_timeout: config.body_read_timeout,
            },
            config.request_timeout,
        );

        // Port 0 lets the OS pick a free port
        let bind_addr = format!("{}:0", bracketed(&config.host));
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| FakeApiError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| FakeApiError::Bind {
            addr: bind_addr,
            source,
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(err) = result {
                // The harness cannot produce a meaningful result without its
                // listener.
                tracing::error!(error = %err, "fake API server failed");
                std::process::exit(1);
            }
        });

        tracing::info!(%addr, "fake API listening");

        Ok(Self {
            addr,
            host: config.host,
            handle,
            shutdown: Some(shutdown_tx),
            shutdown_grace: config.shutdown_grace,
            state,
        })
    }

    /// The port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL built from the configured host.
    pub fn url(&self) -> String {
        format!("http://{}:{}", bracketed(&self.host), self.port())
    }

    /// Get access to the server's shared state.
    pub fn state(&self) -> SharedRunState {
        self.state.clone()
    }

    /// Stop accepting calls.
    ///
    /// In-flight calls get the configured grace period to finish, after which
    /// the server task is aborted. Calling it again is a no-op.
    pub async fn stop(&mut self) {
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };
        let _ = shutdown.send(());

        if tokio::time::timeout(self.shutdown_grace, &mut self.handle)
            .await
            .is_err()
        {
            tracing::debug!("grace period elapsed, forcing fake API shutdown");
            self.handle.abort();
        }
        tracing::info!(addr = %self.addr, "fake API stopped");
    }

    /// Record every expectation that was never met. Call once the client
    /// under test has exited.
    pub async fn complete(&self) {
        self.state.write().await.complete();
    }

    /// The calls received so far, in arrival order.
    pub async fn observed(&self) -> Vec<ObservedCall> {
        self.state.read().await.observed().to_vec()
    }

    /// Errors recorded so far.
    pub async fn errors(&self) -> Vec<RecordedError> {
        self.state.read().await.errors().to_vec()
    }

    /// The commit from the latest `mark_as_processed` call.
    pub async fn commit(&self) -> Option<String> {
        self.state.read().await.commit().map(str::to_string)
    }

    /// Snapshot of the run.
    pub async fn report(&self) -> RunReport {
        self.state.read().await.report()
    }

    /// Create the axum router. Every path is an update call.
    fn create_router(state: HandlerState, request_timeout: Duration) -> Router {
        Router::new()
            .fallback(handlers::record_call)
            .layer(TimeoutLayer::new(request_timeout))
            .with_state(state)
    }
}

/// Wrap bare IPv6 addresses in brackets so a port can follow.
fn bracketed(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
