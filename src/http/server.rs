//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (shield, timeout, request ID, tracing)
//! - Bind server to listener
//! - Forward allowed requests to the upstream application
//! - Swap in a new shield when configuration changes

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::engine::ProbeShield;
use crate::error::ShieldError;
use crate::http::middleware::{protect, ShieldState};
use crate::observability::metrics;

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Shield(#[from] ShieldError),

    #[error("invalid upstream address `{0}`")]
    InvalidUpstream(String),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// Gateway that screens requests and forwards the rest upstream.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    shield: ShieldState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when a configured pattern does not compile or the upstream
    /// address is not a valid authority.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let shield = ShieldState::new(ProbeShield::from_config(&config.shield)?);
        let upstream: Authority = config
            .upstream
            .address
            .parse()
            .map_err(|_| ServerError::InvalidUpstream(config.upstream.address.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState { client, upstream };

        let router = Self::build_router(&config, state, shield.clone());
        Ok(Self {
            router,
            config,
            shield,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, shield: ShieldState) -> Router {
        // Every path, `//admin` included, has to reach the shield.
        let routes = Router::new().fallback(forward_handler).with_state(state);

        protect(routes, shield)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` rebuild the shield. A
    /// configuration whose patterns fail to compile is rejected and the
    /// current shield stays in place.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            rules = self.shield.current().rules().len(),
            "HTTP server starting"
        );

        let shield = self.shield.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match ProbeShield::from_config(&new_config.shield) {
                    Ok(new_shield) => {
                        tracing::info!(
                            rules = new_shield.rules().len(),
                            block_status = %new_shield.status(),
                            log_blocked = new_shield.log_blocked(),
                            "Shield reconfigured"
                        );
                        shield.replace(new_shield);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected shield configuration. Keeping current shield.");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle to the active shield.
    pub fn shield(&self) -> ShieldState {
        self.shield.clone()
    }
}

/// Forward an allowed request to the upstream application.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding request"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream_error();
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
