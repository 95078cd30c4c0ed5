use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::registry::{catalog, execute};
use crate::settings::{self, DeviceConfig};
use crate::state::AppState;
use crate::transport::Transport;
use crate::variables::VARIABLE_DEFINITIONS;

// ── Response types ───────────────────────────────────────────────

#[derive(Serialize)]
struct ApiOk<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct ApiErr {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<AppError>,
}

fn ok_json<T: Serialize>(data: T) -> Response {
    Json(ApiOk { ok: true, data }).into_response()
}

fn err_json(status: StatusCode, msg: String) -> Response {
    (
        status,
        Json(ApiErr {
            ok: false,
            error: msg,
            detail: None,
        }),
    )
        .into_response()
}

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Configuration { .. } | AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        AppError::UnknownAction { .. } => StatusCode::NOT_FOUND,
        AppError::Transport { .. } | AppError::RemoteRejection { .. } => StatusCode::BAD_GATEWAY,
        AppError::IoError { .. } | AppError::SettingsSaveError { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn app_err(error: AppError) -> Response {
    (
        status_for(&error),
        Json(ApiErr {
            ok: false,
            error: error.to_string(),
            detail: Some(error),
        }),
    )
        .into_response()
}

// ── Handlers ─────────────────────────────────────────────────────

async fn get_actions<T: Transport + 'static>(
    Extension(state): Extension<Arc<AppState<T>>>,
) -> Response {
    ok_json(catalog::to_json(&state.registry))
}

/// Body is the option map; an empty body runs the action with defaults.
async fn post_action<T: Transport + 'static>(
    Extension(state): Extension<Arc<AppState<T>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => return err_json(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}")),
        }
    };
    match execute::execute_json(state.as_ref(), &id, &input).await {
        Ok(output) => ok_json(output),
        Err(e) => app_err(e),
    }
}

async fn get_variables<T: Transport + 'static>(
    Extension(state): Extension<Arc<AppState<T>>>,
) -> Response {
    ok_json(state.variables.snapshot())
}

async fn get_variable_definitions() -> Response {
    ok_json(VARIABLE_DEFINITIONS)
}

async fn get_config<T: Transport + 'static>(
    Extension(state): Extension<Arc<AppState<T>>>,
) -> Response {
    ok_json(state.config.read().clone())
}

async fn put_config<T: Transport + 'static>(
    Extension(state): Extension<Arc<AppState<T>>>,
    body: Result<Json<DeviceConfig>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Json(config) = match body {
        Ok(body) => body,
        Err(e) => return err_json(StatusCode::BAD_REQUEST, e.body_text()),
    };
    match state.persist_config(config.clone()) {
        Ok(()) => ok_json(config),
        Err(e) => app_err(e),
    }
}

async fn get_config_schema() -> Response {
    ok_json(settings::config_schema())
}

// ── Server startup ───────────────────────────────────────────────

pub fn router<T: Transport + 'static>(state: Arc<AppState<T>>) -> Router {
    Router::new()
        .route("/api/actions", get(get_actions::<T>))
        .route("/api/actions/{id}", post(post_action::<T>))
        .route("/api/variables", get(get_variables::<T>))
        .route("/api/variables/definitions", get(get_variable_definitions))
        .route("/api/config", get(get_config::<T>).put(put_config::<T>))
        .route("/api/config/schema", get(get_config_schema))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

/// Bind the HTTP API on `addr` and serve it on a background task.
/// Returns the bound address (useful with port 0).
pub async fn start_api_server<T: Transport + 'static>(
    state: Arc<AppState<T>>,
    addr: SocketAddr,
) -> Result<SocketAddr, String> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server: {e}"))?;
    let bound = listener
        .local_addr()
        .map_err(|e| format!("Failed to get API server address: {e}"))?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    tracing::info!(%bound, "API server listening");
    Ok(bound)
}
