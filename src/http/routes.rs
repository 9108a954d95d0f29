//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{info, warn};

use crate::app::AppState;
use crate::commands::{dispatch, Command, CommandError, CommandReply, CommandRequest};
use crate::game::{BoardSnapshot, SessionPhase};
use crate::http::middleware::require_signature;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS for browser renderers (comma-separated in RENDERER_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .renderer_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Public routes (read-only, for rendering adapters and probes)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/session", get(session_handler))
        .route("/ws", get(ws_handler))
        .layer(cors);

    // Signed routes (chat transport)
    let signed_routes = Router::new()
        .route("/commands", post(command_handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_signature));

    Router::new()
        .merge(public_routes)
        .merge(signed_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    phase: SessionPhase,
    players: usize,
    jury: usize,
    ticking: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.game.snapshot();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        phase: snapshot.phase,
        players: snapshot.players.len(),
        jury: snapshot.jury.len(),
        ticking: state.game.ticking(),
    })
}

// ============================================================================
// Board snapshot endpoint
// ============================================================================

async fn session_handler(State(state): State<AppState>) -> Json<BoardSnapshot> {
    Json(state.game.snapshot())
}

// ============================================================================
// Command endpoint
// ============================================================================

async fn command_handler(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandReply>, AppError> {
    if req.participant.trim().is_empty() {
        return Err(AppError::BadRequest("participant is required".to_string()));
    }

    if !state.rate_limiter.check(&req.participant) {
        warn!(participant = %req.participant, "Rate limited command");
        return Err(AppError::RateLimited);
    }

    let command = Command::parse(&req.verb, &req.args)?;
    let tears_down = matches!(command, Command::Destroy | Command::Reset);

    let reply = dispatch(&state.game, &req.participant, command)?;
    if tears_down {
        state.rate_limiter.clear();
    }

    info!(
        participant = %req.participant,
        verb = %req.verb,
        ok = reply.ok,
        "Command handled"
    );
    Ok(Json(reply))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too many commands, slow down")]
    RateLimited,

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                self.to_string(),
            ),
            AppError::Command(CommandError::Game(e)) => return e.clone().into_response(),
            AppError::Command(e) => (StatusCode::BAD_REQUEST, e.code(), e.to_string()),
        };

        let body = serde_json::json!({
            "ok": false,
            "code": code,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::{GameConfig, GameService, Session};
    use crate::http::middleware::tests::sign;
    use crate::http::middleware::SIGNATURE_HEADER;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn state() -> AppState {
        let config = Config {
            server_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "debug".to_string(),
            log_json: false,
            renderer_origin: "http://localhost:5173".to_string(),
            dispatch_secret: SECRET.to_string(),
            signature_tolerance_secs: 300,
            command_rate_limit: 50,
            game: GameConfig::default(),
        };
        let game = GameService::from_session(Session::with_seed(GameConfig::default(), 8));
        AppState::with_game(config, game)
    }

    fn signed_command(body: serde_json::Value) -> Request<Body> {
        let payload = body.to_string();
        let header = sign(payload.as_bytes(), SECRET, chrono::Utc::now().timestamp());
        Request::builder()
            .method("POST")
            .uri("/commands")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, header)
            .body(Body::from(payload))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_phase() {
        let app = build_router(state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["phase"], "uninitialized");
        assert_eq!(body["players"], 0);
    }

    #[tokio::test]
    async fn unsigned_command_is_rejected() {
        let app = build_router(state());
        let request = Request::builder()
            .method("POST")
            .uri("/commands")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"participant":"1","verb":"create"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signed_commands_drive_the_game() {
        let state = state();
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(signed_command(serde_json::json!({
                "participant": "111111111111111111",
                "verb": "create"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(signed_command(serde_json::json!({
                "participant": "111111111111111111",
                "verb": "join",
                "args": ["alice"]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["snapshot"]["players"][0]["name"], "alice");

        let response = app
            .clone()
            .oneshot(signed_command(serde_json::json!({
                "participant": "111111111111111111",
                "verb": "move",
                "args": ["a1"]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["code"], "session_not_in_progress");

        let response = app
            .oneshot(Request::builder().uri("/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["phase"], "lobby");
        assert_eq!(state.game.snapshot().players.len(), 1);
    }

    #[tokio::test]
    async fn unknown_verb_is_bad_request() {
        let app = build_router(state());
        let response = app
            .oneshot(signed_command(serde_json::json!({
                "participant": "1",
                "verb": "dance"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "unknown_verb");
    }
}
