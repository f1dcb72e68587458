//! HTTP API and WebSocket dashboard server

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::modules::alert::{AlertConfig, AlertConfigUpdate, AlertTrigger};
use crate::modules::alert_engine::{AlertEngine, EngineStats, MonitorSession};
use crate::modules::risk_scorer::{calculate_risk_score, RiskScore, TokenRiskData};
use crate::utils::database::AlertRecord;
use crate::utils::notifications::ChannelStatus;
use crate::utils::{DatabaseService, MetricsService, NotificationService};

/// Query params for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
}

/// Monitor request body
#[derive(Debug, Deserialize)]
pub struct MonitorRequest {
    address: String,
}

/// API success response
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    success: bool,
    message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    uptime: f64,
    stats: EngineStats,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AlertEngine>,
    pub notifications: Arc<NotificationService>,
    pub database: DatabaseService,
    pub metrics: Arc<MetricsService>,
    pub start_time: std::time::Instant,
}

/// Dashboard server
pub struct DashboardServer {
    port: u16,
    state: AppState,
}

impl DashboardServer {
    /// Create a new dashboard server
    pub fn new(
        config: &Config,
        engine: Arc<AlertEngine>,
        notifications: Arc<NotificationService>,
        database: DatabaseService,
        metrics: Arc<MetricsService>,
    ) -> Self {
        let state = AppState {
            engine,
            notifications,
            database,
            metrics,
            start_time: std::time::Instant::now(),
        };

        Self {
            port: config.dashboard_port,
            state,
        }
    }

    /// Start the dashboard server
    pub async fn start(&self) -> anyhow::Result<()> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            // Engine
            .route("/api/stats", get(get_stats))
            .route("/api/monitor", post(monitor_token))
            .route("/api/tokens", get(get_sessions))
            // Alerts
            .route("/api/alerts", get(get_alerts))
            .route("/api/alerts/history", get(get_alert_history))
            .route("/api/alerts/:id/read", post(mark_alert_read))
            .route("/api/alerts/:id/star", post(toggle_alert_star))
            // Config
            .route("/api/config", get(get_config).post(update_config))
            // Risk scoring
            .route("/api/risk", post(score_risk))
            // Notification channels
            .route("/api/channels/test", post(test_channels))
            // Prometheus metrics
            .route("/metrics", get(get_metrics))
            // Health check
            .route("/health", get(health_check))
            // WebSocket
            .route("/ws", get(ws_handler))
            .layer(cors)
            .with_state(self.state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(target: "DASHBOARD", "Dashboard running at http://localhost:{}", self.port);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

// ============================================
// HANDLERS
// ============================================

async fn get_stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.get_stats())
}

async fn monitor_token(
    State(state): State<AppState>,
    Json(req): Json<MonitorRequest>,
) -> Json<Vec<AlertTrigger>> {
    Json(state.engine.monitor_token(&req.address).await)
}

async fn get_sessions(State(state): State<AppState>) -> Json<Vec<MonitorSession>> {
    Json(state.engine.sessions())
}

async fn get_alerts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<AlertTrigger>> {
    let limit = params.limit.unwrap_or(50);
    Json(state.engine.recent_alerts(limit))
}

async fn get_alert_history(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<AlertRecord>> {
    let limit = params.limit.unwrap_or(50) as i64;
    match state.database.get_recent_alerts(limit) {
        Ok(alerts) => Json(alerts),
        Err(_) => Json(vec![]),
    }
}

async fn mark_alert_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    if state.engine.mark_as_read(&id) {
        Json(ApiResponse {
            success: true,
            message: format!("Alert {} marked as read", id),
        })
        .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Alert not found"})),
        )
            .into_response()
    }
}

async fn toggle_alert_star(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.engine.toggle_star(&id) {
        Some(starred) => Json(serde_json::json!({
            "success": true,
            "isStarred": starred,
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Alert not found"})),
        )
            .into_response(),
    }
}

async fn get_config(State(state): State<AppState>) -> Json<AlertConfig> {
    Json(state.engine.get_config())
}

async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<AlertConfigUpdate>,
) -> Json<AlertConfig> {
    state.engine.update_config(update);
    Json(state.engine.get_config())
}

async fn score_risk(Json(data): Json<TokenRiskData>) -> Json<RiskScore> {
    Json(calculate_risk_score(&data))
}

async fn test_channels(State(state): State<AppState>) -> Json<ChannelStatus> {
    Json(state.notifications.test_channels().await)
}

async fn get_metrics(State(state): State<AppState>) -> Response {
    let metrics = state.metrics.get_metrics();
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        metrics,
    )
        .into_response()
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime: state.start_time.elapsed().as_secs_f64(),
        stats: state.engine.get_stats(),
    })
}

// WebSocket handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    info!(target: "DASHBOARD", "WebSocket client connected");

    // Send recent triggers on connect
    let recent = state.engine.recent_alerts(20);
    if let Ok(json) = serde_json::to_string(&serde_json::json!({
        "type": "init",
        "data": recent,
    })) {
        let _ = sender.send(Message::Text(json)).await;
    }

    let mut alert_rx = state.engine.subscribe();

    // Forward triggers to the client
    let send_task = tokio::spawn(async move {
        while let Ok(alert) = alert_rx.recv().await {
            let msg = serde_json::json!({ "type": "alert", "data": alert });
            if let Ok(json) = serde_json::to_string(&msg) {
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Drain incoming messages until the client closes
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!(target: "DASHBOARD", "WebSocket client disconnected");
}
