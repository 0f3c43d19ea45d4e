use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::gate::{OperationGate, OperationResult};

/// Compose service every lifecycle route acts on.
pub const MANAGED_SERVICE: &str = "claude-remote";

const STATUS_ARGS: &[&str] = &["ps", "--format", "json"];
const RESTART_ARGS: &[&str] = &["restart", MANAGED_SERVICE];
const REBUILD_ARGS: &[&str] = &["up", "--build", "-d", MANAGED_SERVICE];

/// Shared application state
pub struct AppState {
    pub gate: Arc<OperationGate>,
}

/// API error response
#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError {
            error: "not found".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, Json(self)).into_response()
    }
}

/// Run an operation on its own task so a dropped connection cannot cancel
/// the command or release the slot early.
async fn dispatch(
    state: &AppState,
    args: &'static [&'static str],
    name: &'static str,
) -> OperationResult {
    let gate = Arc::clone(&state.gate);
    match tokio::spawn(async move { gate.execute(args, name).await }).await {
        Ok(result) => result,
        Err(e) => {
            error!(op = name, error = %e, "Operation task failed");
            OperationResult::failure(format!("Operation task failed: {}", e))
        }
    }
}

fn lifecycle_response(result: OperationResult) -> (StatusCode, Json<OperationResult>) {
    let status = if result.ok {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(result))
}

/// GET /status. Always 200; failure is reported through `ok`.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OperationResult> {
    Json(dispatch(&state, STATUS_ARGS, "status").await)
}

/// POST /restart-claude
pub async fn restart_claude(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<OperationResult>) {
    lifecycle_response(dispatch(&state, RESTART_ARGS, "restart").await)
}

/// POST /rebuild-claude
pub async fn rebuild_claude(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<OperationResult>) {
    lifecycle_response(dispatch(&state, REBUILD_ARGS, "rebuild").await)
}

/// Catch-all for unknown paths and unsupported methods. OPTIONS is answered
/// everywhere so browsers can preflight.
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        ApiError::not_found().into_response()
    }
}
