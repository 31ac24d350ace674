//! Liveness, health and readiness endpoints.

use crate::AppResources;
use axum::{Extension, Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const MISC_TAG: &str = "Miscellaneous";

#[tracing::instrument()]
#[utoipa::path(
    get,
    path = "/ping",
    tag = MISC_TAG,
    operation_id = "Ping",
    summary = "Liveness check",
    responses(
        (status = 200, description = "Service is running", body = str, content_type = "text/plain", example = "pong")
    )
)]
pub async fn ping() -> &'static str {
    "pong"
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `ok`
    pub status: String,
    /// Seconds since the process started, two decimals
    pub uptime: f64,
    /// RFC 3339 timestamp of the response
    pub timestamp: String,
    /// Time spent producing this response
    pub latency_ms: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/health",
    tag = MISC_TAG,
    operation_id = "Health Check",
    summary = "Service health",
    description = "Returns service status, uptime, timestamp and the latency of this check. \
                   Does not touch any dependency; see `/ready` for that.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(Extension(resources): Extension<AppResources>) -> Json<HealthResponse> {
    let start = Instant::now();

    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    let uptime = round2(resources.started_at.elapsed().as_secs_f64());

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime,
        timestamp,
        latency_ms: round2(start.elapsed().as_secs_f64() * 1000.0),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    pub status: ComponentStatus,
    pub postgres: ComponentStatus,
    pub redis: ComponentStatus,
    /// Names the failing dependencies, never their errors. Present only when not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/ready",
    tag = MISC_TAG,
    operation_id = "Readiness Check",
    summary = "Dependency readiness",
    description = "Pings the relational store and the cache. Responds `503` when either is unreachable.",
    responses(
        (status = 200, description = "All dependencies reachable", body = ReadyResponse),
        (status = 503, description = "At least one dependency unreachable", body = ReadyResponse),
    )
)]
pub async fn ready(
    Extension(resources): Extension<AppResources>,
) -> (StatusCode, Json<ReadyResponse>) {
    let (db_result, cache_result) = tokio::join!(resources.db.ping(), resources.cache.ping());

    let mut failures = Vec::new();
    let postgres = match db_result {
        Ok(()) => ComponentStatus::Ok,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            failures.push("postgres unreachable");
            ComponentStatus::Error
        }
    };
    let redis = match cache_result {
        Ok(()) => ComponentStatus::Ok,
        Err(e) => {
            tracing::warn!(error = %e, "Cache ping failed");
            failures.push("redis unreachable");
            ComponentStatus::Error
        }
    };

    if failures.is_empty() {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: ComponentStatus::Ok,
                postgres,
                redis,
                details: None,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: ComponentStatus::Error,
                postgres,
                redis,
                details: Some(failures.join("; ")),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(12.0), 12.0);
    }

    #[test]
    fn test_ready_body_omits_details_when_ok() {
        let body = serde_json::to_value(ReadyResponse {
            status: ComponentStatus::Ok,
            postgres: ComponentStatus::Ok,
            redis: ComponentStatus::Ok,
            details: None,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "ok", "postgres": "ok", "redis": "ok"})
        );
    }
}
