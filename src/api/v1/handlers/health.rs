/*
 * Responsibility
 * - GET /health (疎通用、認証なし)
 * - DB / cache の到達性を返す (落ちていても 200、status で表現)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (db, cache) = tokio::join!(state.users.ping(), state.cache.ping());

    let database = match db {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health: database unreachable");
            "unavailable"
        }
    };
    let cache = match cache {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health: cache unreachable");
            "unavailable"
        }
    };
    let status = if database == "ok" && cache == "ok" {
        "healthy"
    } else {
        "degraded"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": status,
            "timestamp": Utc::now().to_rfc3339(),
            "uptime": state.started_at.elapsed().as_secs(),
            "environment": state.app_env.as_str(),
            "dependencies": {
                "database": database,
                "cache": cache,
            },
        })),
    )
}
