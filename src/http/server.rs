//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Nest the route table under the configured mount path
//! - Wire up middleware (tracing, request ID, timeout)
//! - Serve on a bound listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::error::{DefaultErrorHandler, ErrorHandler};
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::lifecycle::{shutdown_signal, Shutdown};
use crate::routing::table::{not_found, MountOptions, RouteTable};

/// HTTP server for a controller table.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server answering failures with [`DefaultErrorHandler`].
    pub fn new(config: ServerConfig, table: RouteTable) -> Self {
        Self::with_error_handler(config, table, DefaultErrorHandler)
    }

    /// Create a server forwarding every dispatch failure to `handler`.
    pub fn with_error_handler(
        config: ServerConfig,
        table: RouteTable,
        handler: impl ErrorHandler,
    ) -> Self {
        let options = MountOptions {
            error_handler: Arc::new(handler),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, &table, options);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, table: &RouteTable, options: MountOptions) -> Router {
        let fallback = not_found(Arc::clone(&options.error_handler));

        table
            .routes_under(&config.routing.mount_path, options)
            .fallback(fallback)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = request.request_id().unwrap_or("unknown"),
                )
            }))
            .layer(RequestIdLayer)
    }

    /// Make `value` available to every request through its extensions.
    pub fn with_extension<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.router = self.router.layer(axum::Extension(value));
        self
    }

    /// The fully layered application, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` triggers or the process is signalled.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.routing.mount_path,
            "HTTP server starting"
        );

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = stop.recv() => tracing::info!("Shutdown requested"),
                    _ = shutdown_signal() => {},
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
