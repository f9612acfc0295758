//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (tracing)
//! - Bind server to listener
//! - Run the capture → rewrite → dispatch → observe pipeline per request

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::request::{Director, ProxyRequest};
use crate::http::response::into_client_response;
use crate::lifecycle::ShutdownSignal;
use crate::net::transport::{TransportError, UpstreamTransport};
use crate::observability::ProxyObserver;
use crate::routing::TargetConfig;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub director: Arc<Director>,
    pub transport: UpstreamTransport,
    pub observer: Arc<dyn ProxyObserver>,
}

/// HTTP server for the logging proxy.
pub struct HttpServer {
    router: Router,
    target: TargetConfig,
}

impl HttpServer {
    /// Create a new HTTP server forwarding to `target`.
    pub fn new(
        config: &ProxyConfig,
        target: TargetConfig,
        observer: Arc<dyn ProxyObserver>,
    ) -> Result<Self, TransportError> {
        let transport = UpstreamTransport::new(&config.transport, &target)?;

        let state = AppState {
            director: Arc::new(Director::new(target.clone())),
            transport,
            observer,
        };

        let router = Self::build_router(state);
        Ok(Self { router, target })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::debug!(
            address = %addr,
            upstream = %self.target,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Captures the request, rewrites it for the target and relays the response.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    // 1. Capture body
    let mut request = match ProxyRequest::capture(request).await {
        Ok(r) => r,
        Err(e) => {
            state.observer.on_error(&method, &uri, &e);
            return e.into_response();
        }
    };
    state.observer.on_request(&request);

    // 2. Rewrite for the target
    if let Err(e) = state.director.direct(&mut request, client) {
        state.observer.on_error(&method, &uri, &e);
        return e.into_response();
    }
    state.observer.on_forward(&request);

    // 3. Dispatch
    match state.transport.dispatch(&request).await {
        Ok(upstream) => {
            let response = into_client_response(upstream);
            state.observer.on_response(&request, &response);
            response
        }
        Err(e) => {
            state.observer.on_error(request.method(), request.uri(), &e);
            e.into_response()
        }
    }
}
