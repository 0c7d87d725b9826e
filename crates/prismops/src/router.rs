//! HTTP router for the streamable MCP transport

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde_json::{Value, json};

use prismops_exec::SshConnector;

use crate::mcp::PrismOpsServer;
use crate::tools::Toolbox;

/// Create the application router
///
/// MCP is served under `/mcp`; `/health` answers liveness checks.
pub fn create_router(toolbox: Arc<Toolbox<SshConnector>>) -> Router {
    let server = PrismOpsServer::new(toolbox);
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp_service)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
