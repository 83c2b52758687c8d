//! HTTP surface for the storefront's mint flow.

use crate::error::AllowlistError;
use crate::query::{AllowlistService, QueryOutcome};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const PROOF_ROUTE: &str = "/api/whitelist-proof";
pub const ROOT_ROUTE: &str = "/api/whitelist-root";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofParams {
    pub address: Option<String>,
    pub token_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub root: String,
    pub encoding: String,
    pub entries: usize,
}

struct ApiError(AllowlistError);

impl From<AllowlistError> for ApiError {
    fn from(err: AllowlistError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_bad_request() {
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self.0, "allowlist query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn proof_handler(
    State(service): State<Arc<AllowlistService>>,
    Query(params): Query<ProofParams>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let outcome = service.query(params.address.as_deref(), params.token_id.as_deref())?;
    info!(
        address = params.address.as_deref().unwrap_or_default(),
        token_id = params.token_id.as_deref().unwrap_or_default(),
        whitelisted = outcome.is_whitelisted(),
        "whitelist proof request"
    );
    Ok(Json(outcome))
}

async fn root_handler(
    State(service): State<Arc<AllowlistService>>,
) -> Result<Json<RootResponse>, ApiError> {
    Ok(Json(RootResponse {
        root: service.root()?,
        encoding: service.encoding().to_string(),
        entries: service.allocations().len(),
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router(service: Arc<AllowlistService>) -> Router {
    Router::new()
        .route(PROOF_ROUTE, get(proof_handler))
        .route(ROOT_ROUTE, get(root_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serves until ctrl-c.
pub async fn serve(listen: &str, service: Arc<AllowlistService>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(addr = %listener.local_addr()?, "allowlist service listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await
}

/// Resolves when `signal` fires. A signal that fails to install is logged
/// and never resolves, so the server keeps running.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            error!(error = %e, "failed to install shutdown signal handler");
            std::future::pending::<()>().await;
        }
    }
}
