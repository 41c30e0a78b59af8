//! HTTP 中间件
//! 应用状态与请求追踪

use crate::{
    auth::{jwt::TokenCodec, AuthGuard},
    config::AppConfig,
    error::AppError,
    repository::{SessionStore, UserDirectory},
    services::AuthService,
};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 请求之间只共享不可变的状态：签名密钥封装在 TokenCodec 中，
/// 存储句柄自身负责并发访问。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// 使用内存存储时为 None
    pub db: Option<sqlx::PgPool>,
    pub auth_service: Arc<AuthService>,
    pub auth_guard: Arc<AuthGuard>,
}

impl AppState {
    /// 组装服务，签名密钥在此处一次性注入
    pub fn new(
        config: AppConfig,
        db: Option<sqlx::PgPool>,
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, AppError> {
        let codec = Arc::new(TokenCodec::from_config(&config)?);

        let auth_guard = Arc::new(AuthGuard::new(codec.clone(), sessions.clone(), users.clone()));
        let auth_service = Arc::new(AuthService::new(users, sessions, codec));

        Ok(Self {
            config,
            db,
            auth_service,
            auth_guard,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 指标标签使用静态字符串
        let status_class = match status {
            200..=299 => "2xx",
            400..=499 => "4xx",
            500..=599 => "5xx",
            _ => "other",
        };
        metrics::counter!("http_requests_total", "status" => status_class).increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
