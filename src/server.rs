//! HTTP surface.
//!
//! Three public routes (`/health`, `/analyze`) plus an admin surface
//! under `/admin` guarded by a shared-secret header. Per-node failures
//! never surface as HTTP errors - they ride inside the outcome body.
//! Only validation (400) and an unreadable node store (500) escape.

use crate::directory::{NodeDirectory, NodeUpdate};
use crate::error::EngineError;
use crate::models::AnalysisRequest;
use crate::orchestrator::ScatterGatherOrchestrator;
use crate::probe::HealthProbe;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

/// Shared state handed to every handler.
pub struct AppState {
    pub directory: Arc<NodeDirectory>,
    pub orchestrator: ScatterGatherOrchestrator,
    pub probe: HealthProbe,
    /// Shared secret for `/admin`. Empty disables the admin surface.
    pub admin_key: String,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/nodes", get(list_nodes))
        .route("/nodes/{id}", post(update_node))
        .route("/nodes/{id}/ping", post(ping_node))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_key,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .nest("/admin", admin)
        .with_state(state)
}

/// Admin gate: every `/admin` request must carry the shared secret in
/// the `x-admin-key` header. An empty configured key rejects everything,
/// so an unconfigured deployment exposes no admin surface.
async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if state.admin_key.is_empty() || presented != state.admin_key {
        warn!("Rejected admin request to {}", request.uri().path());
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    next.run(request).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
    };

    match state.orchestrator.analyze(&request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e @ EngineError::EmptyQuery) => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e @ EngineError::Directory(_)) => {
            error!("Analysis failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn list_nodes(State(state): State<Arc<AppState>>) -> Response {
    match state.directory.read_all() {
        Ok(nodes) => (StatusCode::OK, Json(nodes)).into_response(),
        Err(e) => {
            error!("Failed to list nodes: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list nodes")
        }
    }
}

async fn update_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<NodeUpdate>, JsonRejection>,
) -> Response {
    // Unknown fields fail deserialization, so the allow-list is enforced
    // here rather than silently dropping extras.
    let Ok(Json(update)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid update payload");
    };

    match state.directory.update_fields(&id, &update) {
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Node not found"),
        Ok(true) => match state.directory.read_one(&id) {
            Ok(Some(node)) => (StatusCode::OK, Json(node)).into_response(),
            _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to reload node"),
        },
        Err(e) => {
            error!("Failed to update node {}: {:#}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update node")
        }
    }
}

async fn ping_node(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.probe.ping(&id).await {
        Ok(Some(outcome)) => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Node not found"),
        Err(e) => {
            error!("Failed to ping node {}: {:#}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to ping node")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InferenceClient;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const KEY: &str = "test-admin-key";

    fn test_router(tmp: &TempDir, admin_key: &str) -> Router {
        let directory =
            Arc::new(NodeDirectory::open(tmp.path().join("nodes.toml")).unwrap());
        let client = InferenceClient::new();

        let state = Arc::new(AppState {
            directory: directory.clone(),
            orchestrator: ScatterGatherOrchestrator::new(
                directory.clone(),
                client.clone(),
                Duration::from_secs(1),
            ),
            probe: HealthProbe::new(directory, client, Duration::from_secs(1)),
            admin_key: admin_key.to_string(),
        });

        build_router(state)
    }

    fn get_req(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str, key: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header("x-admin-key", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_ok() {
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY).oneshot(get_req("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_missing_query_is_400() {
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY)
            .oneshot(post_json("/analyze", "{}", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing 'query' field");
    }

    #[tokio::test]
    async fn test_analyze_no_active_nodes_is_200() {
        // Seeded nodes have no endpoints; the outcome is still 200 with
        // a structured body, not an HTTP error.
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY)
            .oneshot(post_json("/analyze", r#"{"query": "EURUSD?"}"#, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["degraded"], true);
        assert_eq!(json["nodesQueried"], 0);
        assert_eq!(json["error"], "No active nodes");
    }

    #[tokio::test]
    async fn test_admin_requires_key() {
        let tmp = TempDir::new().unwrap();
        let router = test_router(&tmp, KEY);

        // No key.
        let response = router
            .clone()
            .oneshot(get_req("/admin/nodes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Wrong key.
        let response = router
            .clone()
            .oneshot(post_json("/admin/nodes/node-analyst", "{}", Some("nope")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Right key.
        let mut request = get_req("/admin/nodes");
        request
            .headers_mut()
            .insert("x-admin-key", KEY.parse().unwrap());
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_disabled_when_key_empty() {
        let tmp = TempDir::new().unwrap();
        let router = test_router(&tmp, "");

        // Even an empty presented key must not match an empty configured key.
        let mut request = get_req("/admin/nodes");
        request.headers_mut().insert("x-admin-key", "".parse().unwrap());
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_list_nodes() {
        let tmp = TempDir::new().unwrap();
        let mut request = get_req("/admin/nodes");
        request
            .headers_mut()
            .insert("x-admin-key", KEY.parse().unwrap());

        let response = test_router(&tmp, KEY).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let nodes = json.as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["status"], "offline");
    }

    #[tokio::test]
    async fn test_admin_update_node_returns_updated() {
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY)
            .oneshot(post_json(
                "/admin/nodes/node-analyst",
                r#"{"host": "10.0.0.5", "port": 11500}"#,
                Some(KEY),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["host"], "10.0.0.5");
        assert_eq!(json["port"], 11500);
        assert_eq!(json["persona"], "analyst");
    }

    #[tokio::test]
    async fn test_admin_update_unknown_node_is_404() {
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY)
            .oneshot(post_json(
                "/admin/nodes/ghost",
                r#"{"host": "10.0.0.5"}"#,
                Some(KEY),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_update_rejects_non_allowlisted_field() {
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY)
            .oneshot(post_json(
                "/admin/nodes/node-analyst",
                r#"{"persona": "risk"}"#,
                Some(KEY),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_ping_without_endpoint() {
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY)
            .oneshot(post_json("/admin/nodes/node-risk/ping", "", Some(KEY)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["reachable"], false);
        assert_eq!(json["error"], "No endpoint configured");
    }

    #[tokio::test]
    async fn test_admin_ping_unknown_node_is_404() {
        let tmp = TempDir::new().unwrap();
        let response = test_router(&tmp, KEY)
            .oneshot(post_json("/admin/nodes/ghost/ping", "", Some(KEY)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
