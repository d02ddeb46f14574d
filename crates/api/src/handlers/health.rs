//! Health check handlers

use crate::AppState;
use axum::{extract::State, Json};
use maktaba_common::{metrics, VERSION};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION,
    })
}

/// Readiness probe - pings the database and records the latency
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let start = std::time::Instant::now();

    let db_check = match state.db.ping().await {
        Ok(_) => {
            let elapsed = start.elapsed();
            metrics::record_db_ping("up", elapsed.as_secs_f64());
            CheckResult {
                status: "up".to_string(),
                latency_ms: Some(elapsed.as_millis() as u64),
                error: None,
            }
        }
        Err(e) => {
            metrics::record_db_ping("down", start.elapsed().as_secs_f64());
            CheckResult {
                status: "down".to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            }
        }
    };

    let all_healthy = db_check.status == "up";

    Json(ReadyResponse {
        status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
        checks: HealthChecks { database: db_check },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_version() {
        let response = health().await;
        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.version, VERSION);
    }
}
