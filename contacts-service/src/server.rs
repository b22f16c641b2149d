//! HTTP server with graceful shutdown

use axum::{extract::DefaultBodyLimit, response::IntoResponse, Router};
use std::any::Any;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    handlers::{ApiError, ApiOperation},
    middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer, TrustedIdentity,
    },
};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wrap `app` in the middleware stack
    ///
    /// Layers are added innermost first: panic recovery sits closest to the
    /// handlers, CORS is the outermost layer.
    pub fn apply_middleware(&self, app: Router) -> Result<Router> {
        let identity_header = TrustedIdentity::from_config(&self.config.identity)?
            .header()
            .clone();
        let middleware = &self.config.middleware;

        let mut app = app;
        if middleware.catch_panic {
            app = app.layer(CatchPanicLayer::custom(panic_response));
        }

        let mut app = app
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                self.config.timeout(),
            ))
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes()))
            // Extractors otherwise stop at axum's own 2 MB default
            .layer(DefaultBodyLimit::max(self.config.body_limit_bytes()))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            // Marked before the trace layer sees the request
            .layer(sensitive_headers_layer([identity_header]))
            .layer(request_id_propagation_layer())
            .layer(request_id_layer());

        if middleware.compression {
            app = app.layer(CompressionLayer::new());
        }

        Ok(app.layer(self.build_cors_layer()))
    }

    /// Run the server with the given router
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));

        tracing::info!("Starting {} on {}", self.config.service.name, addr);
        self.log_middleware_config();

        let app = self.apply_middleware(app)?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    fn log_middleware_config(&self) {
        let middleware = &self.config.middleware;
        tracing::info!(
            catch_panic = middleware.catch_panic,
            compression = middleware.compression,
            cors_mode = %middleware.cors_mode,
            body_limit_mb = middleware.body_limit_mb,
            timeout_secs = self.config.service.timeout_secs,
            identity_header = %self.config.identity.user_header,
            "Middleware configuration"
        );
    }

    /// Build CORS layer based on configuration
    fn build_cors_layer(&self) -> CorsLayer {
        match self.config.middleware.cors_mode.as_str() {
            "permissive" => {
                tracing::debug!("Enabling permissive CORS");
                CorsLayer::permissive()
            }
            "restrictive" => {
                tracing::debug!("Enabling restrictive CORS (default deny)");
                CorsLayer::new()
            }
            other => {
                tracing::warn!("Unknown CORS mode: {}, defaulting to permissive", other);
                CorsLayer::permissive()
            }
        }
    }
}

/// Render a handler panic as a 500 `ApiError`
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> http::Response<axum::body::Body> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::internal(ApiOperation::Route, format!("handler panicked: {detail}")).into_response()
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{routes::router, state::AppState};
    use axum::{
        body::Body,
        routing::{get, post},
    };
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, config.service.port);
    }

    #[tokio::test]
    async fn test_panics_become_error_envelope() {
        async fn boom() -> &'static str {
            panic!("kaboom")
        }
        let app = Router::new().route("/boom", get(boom));
        let app = Server::new(Config::default()).apply_middleware(app).unwrap();

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Something went wrong");
    }

    #[tokio::test]
    async fn test_body_limit_is_enforced() {
        let mut config = Config::default();
        config.middleware.body_limit_mb = 0;
        let app = Router::new().route("/echo", post(|body: String| async move { body }));
        let app = Server::new(config).apply_middleware(app).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-length", "5")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    fn contact_request(name: &str) -> Request<Body> {
        let body = serde_json::json!({ "name": name, "phoneNumber": "555" });
        Request::builder()
            .method("POST")
            .uri("/contacts")
            .header("x-user-id", "65a1f0c2e4b0a1b2c3d4a11c")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_configured_body_limit_applies_to_json() {
        let config = Config::default();
        let app = router(AppState::in_memory(config.clone())).unwrap();
        let app = Server::new(config).apply_middleware(app).unwrap();

        let name = "a".repeat(3 * 1024 * 1024);
        let response = app.oneshot(contact_request(&name)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_oversized_json_is_413_envelope() {
        let mut config = Config::default();
        config.middleware.body_limit_mb = 1;
        let app = router(AppState::in_memory(config.clone())).unwrap();
        let app = Server::new(config).apply_middleware(app).unwrap();

        let name = "a".repeat(2 * 1024 * 1024);
        let response = app.oneshot(contact_request(&name)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(body["data"]["operation"], "create");
    }
}
