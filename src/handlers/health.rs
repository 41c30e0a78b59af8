//! 存活与就绪探针

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::{
    db,
    middleware::AppState,
    models::response::{ApiResponse, ResponseStatus},
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub version: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 单个依赖的检查结果
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// 记录进程启动时刻；只有第一次调用生效
pub fn set_start_time() {
    STARTED_AT.get_or_init(Instant::now);
}

pub fn uptime_secs() -> u64 {
    STARTED_AT.get().map_or(0, |t| t.elapsed().as_secs())
}

/// GET /health：不访问任何依赖
pub async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(
        "Service is alive",
        HealthResponse {
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: uptime_secs(),
        },
    ))
}

/// GET /ready：依赖不可用时返回 503
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<ReadinessResponse>>) {
    let check = match &state.db {
        Some(pool) => {
            let healthy = db::health_check(pool).await == db::HealthStatus::Healthy;
            HealthCheck {
                name: "database",
                healthy,
                message: (!healthy).then_some("unreachable"),
            }
        }
        None => HealthCheck {
            name: "storage",
            healthy: true,
            message: Some("in-memory"),
        },
    };

    readiness_response(vec![check])
}

fn readiness_response(
    checks: Vec<HealthCheck>,
) -> (StatusCode, Json<ApiResponse<ReadinessResponse>>) {
    let ready = checks.iter().all(|c| c.healthy);
    let data = ReadinessResponse { ready, checks };

    if ready {
        (StatusCode::OK, Json(ApiResponse::success("Service is ready", data)))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                status: ResponseStatus::Error,
                data: Some(data),
                message: "Service is not ready".to_string(),
            }),
        )
    }
}
