//! HTTP route definitions

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::{handle_socket, ws_handler};

/// Body served on `/` when no game page is installed
const FALLBACK_PAGE: &str = "Pistol Duel Server Running";

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - any origin unless CLIENT_ORIGIN narrows it down
    let allowed_origins = if state.config.client_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .client_origins
            .iter()
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(root_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Game page
// ============================================================================

/// Browsers open the game socket on the bare host, so `/` doubles as the
/// WebSocket endpoint
async fn root_handler(
    ws: Option<WebSocketUpgrade>,
    State(state): State<AppState>,
) -> Response {
    if let Some(ws) = ws {
        return ws.on_upgrade(move |socket| handle_socket(socket, state));
    }

    match tokio::fs::read_to_string(&state.config.static_page).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            debug!(
                path = %state.config.static_page.display(),
                error = %e,
                "Game page unavailable, serving fallback"
            );
            FALLBACK_PAGE.into_response()
        }
    }
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_rooms: usize,
    connected_players: usize,
    /// Someone is parked in the queue, the next arrival gets paired
    waiting: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_rooms: state.sessions.active_rooms(),
        connected_players: state.sessions.connected_players(),
        waiting: state.sessions.waiting_for().is_some(),
    })
}

// ============================================================================
// Error handling
// ============================================================================

async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ws::connection::Connection;

    fn state() -> AppState {
        AppState::new(Config {
            static_page: "definitely/not/here.html".into(),
            ..Config::default()
        })
    }

    fn app() -> Router {
        build_router(state())
    }

    async fn fetch(router: Router, path: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_serves_fallback_page() {
        let (status, body) = fetch(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, FALLBACK_PAGE);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, body) = fetch(app(), "/favicon.ico").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("/favicon.ico"));
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let (status, body) = fetch(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["activeRooms"], 0);
        assert_eq!(json["connectedPlayers"], 0);
        assert_eq!(json["waiting"], false);
    }

    #[tokio::test]
    async fn health_reports_a_waiting_player() {
        let state = state();
        let (a, _a_rx) = Connection::channel();
        state.sessions.on_connect(a);

        let (_, body) = fetch(build_router(state.clone()), "/health").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["waiting"], true);
        assert_eq!(json["activeRooms"], 0);
        assert_eq!(json["connectedPlayers"], 1);

        let (b, _b_rx) = Connection::channel();
        state.sessions.on_connect(b);

        let (_, body) = fetch(build_router(state), "/health").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["waiting"], false);
        assert_eq!(json["activeRooms"], 1);
        assert_eq!(json["connectedPlayers"], 2);
    }
}
