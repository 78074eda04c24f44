//! HTTP server for payload classification and metrics.
//!
//! The wire contract matches the browser front-end consumer:
//! `POST /classify` takes `{ "qrData": string }` and answers
//! `{ "success": bool, "data": { "address", "type" }, "error" }`.
//! An empty payload is rejected with `success:false`; classification
//! itself never fails.

use crate::classify::{classify, ScanResult};
use crate::metrics::MetricsRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Errors that can occur during service operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the scan service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 9090).into(),
        }
    }
}

impl ServerConfig {
    /// Creates a config with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

impl From<&crate::capture::ServiceConfig> for ServerConfig {
    fn from(config: &crate::capture::ServiceConfig) -> Self {
        Self::with_port(config.port)
    }
}

/// Classification request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    /// Raw payload decoded from the QR code.
    pub qr_data: String,
}

/// Classification response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    /// Whether classification produced a result.
    pub success: bool,
    /// Classified payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ScanResult>,
    /// Failure description, present on rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassifyResponse {
    fn ok(result: ScanResult) -> Self {
        Self {
            success: true,
            data: Some(result),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Shared state for the scan service.
pub struct ServiceState {
    registry: MetricsRegistry,
}

impl ServiceState {
    /// Updates the metrics from a snapshot.
    pub fn update(&self, snapshot: &crate::metrics::MetricsSnapshot) {
        self.registry.update(snapshot);
    }
}

/// HTTP service exposing classification and metrics.
pub struct ScanService {
    config: ServerConfig,
    state: Arc<RwLock<ServiceState>>,
}

impl ScanService {
    /// Creates a new service around a metrics registry.
    pub fn new(config: ServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ServiceState { registry })),
        }
    }

    /// Returns a reference to the shared state for updating metrics.
    pub fn state(&self) -> Arc<RwLock<ServiceState>> {
        Arc::clone(&self.state)
    }

    /// Starts the HTTP server.
    ///
    /// Runs until the server is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = Router::new()
            .route("/classify", post(classify_handler))
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            // Consumed cross-origin by the browser front-end
            .layer(CorsLayer::permissive())
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            "Scan service listening"
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the /classify endpoint.
async fn classify_handler(
    Json(request): Json<ClassifyRequest>,
) -> (StatusCode, Json<ClassifyResponse>) {
    if request.qr_data.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ClassifyResponse::err("No QR data provided")),
        );
    }

    let kind = classify(&request.qr_data);
    tracing::debug!(%kind, len = request.qr_data.len(), "Classified payload");
    (
        StatusCode::OK,
        Json(ClassifyResponse::ok(ScanResult::new(request.qr_data, kind))),
    )
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(
    State(state): State<Arc<RwLock<ServiceState>>>,
) -> impl IntoResponse {
    let state = state.read().await;

    match state.registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PayloadKind;

    #[test]
    fn test_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 9090);
    }

    #[test]
    fn test_config_with_port() {
        let config = ServerConfig::with_port(8080);
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_config_bridges_file_section() {
        let file = crate::capture::FileConfig {
            service: crate::capture::ServiceConfig { port: 7171 },
            ..Default::default()
        };
        let config = ServerConfig::from(&file.service);
        assert_eq!(config.bind_addr.port(), 7171);
    }

    #[tokio::test]
    async fn test_classify_handler_ethereum() {
        let request = ClassifyRequest {
            qr_data: "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".into(),
        };
        let (status, Json(response)) = classify_handler(Json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.kind, PayloadKind::Ethereum);
    }

    #[tokio::test]
    async fn test_classify_handler_rejects_empty() {
        let request = ClassifyRequest {
            qr_data: String::new(),
        };
        let (status, Json(response)) = classify_handler(Json(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("No QR data provided"));
    }
}
