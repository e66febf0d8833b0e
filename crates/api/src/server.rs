// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server lifecycle
//!
//! Builds the router over a [`ProviderRegistry`], binds the listener and runs
//! until the process receives SIGINT/SIGTERM or the server's
//! `CancellationToken` is cancelled. In-flight lookups then get
//! [`ShutdownConfig::graceful_timeout`] to finish.

use std::{future::IntoFuture, net::SocketAddr, pin::pin, sync::Arc, time::Duration};

use axum::{Router, http::HeaderName};
use external_apis::ProviderRegistry;
use hyper::Request;
use tokio::{net::TcpListener, time::sleep};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{Span, error, info, info_span, warn};

use crate::{
    config::ServerConfig,
    error::{ServerError, ServerResult},
    routes::create_routes,
    state::ServerState,
};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Configuration for server shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Maximum time to wait for in-flight requests once shutdown starts
    pub graceful_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(30),
        }
    }
}

/// zip-finder HTTP server
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    router: Router,
    state: ServerState,
    cancellation_token: CancellationToken,
    shutdown_config: ShutdownConfig,
}

impl Server {
    /// Create a server racing the production providers
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Dependency` if the provider registry cannot be built.
    pub fn new(config: ServerConfig, shutdown_config: ShutdownConfig) -> ServerResult<Self> {
        let registry = ProviderRegistry::new().map_err(|e| ServerError::Dependency {
            message: e.to_string(),
        })?;
        Ok(Self::with_registry(config, shutdown_config, Arc::new(registry)))
    }

    /// Create a server racing the providers of `registry`
    pub fn with_registry(
        config: ServerConfig,
        shutdown_config: ShutdownConfig,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let state = ServerState::new(config.clone(), registry, cancellation_token.child_token());
        let router = router(state.clone());

        Self {
            config,
            router,
            state,
            cancellation_token,
            shutdown_config,
        }
    }

    /// Serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind`/`ServerError::Startup` when the listener
    /// cannot be set up, `ServerError::Shutdown` when serving fails, and
    /// `ServerError::Timeout` when draining outlasts the graceful timeout.
    pub async fn run(self) -> ServerResult<()> {
        let (listener, address) = bind(&self.config).await?;

        info!(
            %address,
            environment = %self.config.environment,
            providers = ?self.state.registry().provider_names(),
            "zip-finder server listening",
        );

        tokio::spawn(cancel_on_signal(self.cancellation_token.clone()));

        let token = self.cancellation_token;
        let drain_token = token.clone();
        let serve = pin!(
            axum::serve(listener, self.router)
                .with_graceful_shutdown(async move {
                    drain_token.cancelled().await;
                    info!("draining connections");
                })
                .into_future()
        );

        let graceful_timeout = self.shutdown_config.graceful_timeout;
        let drain_expired = async move {
            token.cancelled().await;
            sleep(graceful_timeout).await;
        };

        tokio::select! {
            result = serve => result.map_err(|source| {
                error!(error = %source, "server stopped with an error");
                ServerError::Shutdown { source }
            }),
            () = drain_expired => {
                warn!(?graceful_timeout, "drain timed out, dropping open connections");
                Err(ServerError::Timeout {
                    timeout_seconds: graceful_timeout.as_secs(),
                })
            }
        }
    }

    /// Serve in the background and return the bound address
    ///
    /// Cancelling the returned token stops the server.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address.
    pub async fn run_for_testing(self) -> ServerResult<(SocketAddr, CancellationToken)> {
        let (listener, address) = bind(&self.config).await?;

        let token = self.cancellation_token.child_token();
        let stop = token.child_token();
        tokio::spawn(async move {
            let _ = axum::serve(listener, self.router)
                .with_graceful_shutdown(async move { stop.cancelled().await })
                .await;
        });

        Ok((address, token))
    }

    /// Returns a clone of the cancellation token for coordinated shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Initiates graceful shutdown by cancelling the server's cancellation token
    pub fn shutdown(&self) {
        info!("programmatic shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get server state
    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

/// Routes plus the middleware stack: request id, trace span, CORS, timeout
fn router(state: ServerState) -> Router {
    let timeout = state.config().timeout_seconds.value();

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(timeout));

    create_routes().layer(middleware).with_state(state)
}

fn request_span<B>(request: &Request<B>) -> Span {
    match request.headers().get(REQUEST_ID_HEADER) {
        Some(request_id) => info_span!(
            "http_request",
            ?request_id,
            method = %request.method(),
            path = request.uri().path(),
        ),
        None => {
            error!("failed to extract id from request");
            info_span!("http_request", request_id = "unknown")
        }
    }
}

async fn bind(config: &ServerConfig) -> ServerResult<(TcpListener, SocketAddr)> {
    let address = config.socket_addr();
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;
    let bound = listener
        .local_addr()
        .map_err(|source| ServerError::Startup { source })?;
    Ok((listener, bound))
}

/// Cancel `token` on SIGINT/SIGTERM (Ctrl+C elsewhere), or return once it is cancelled
async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        signal = shutdown_signal() => {
            warn!(signal, "shutdown signal received, cancelling");
            token.cancel();
        }
        () = token.cancelled() => {}
    }
}

#[cfg(unix)]
#[allow(clippy::expect_used)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
#[allow(clippy::expect_used)]
async fn shutdown_signal() -> &'static str {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    "CTRL+C"
}
