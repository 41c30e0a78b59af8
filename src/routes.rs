//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{handlers, middleware::AppState};

/// 请求体上限（64 KiB）
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需会话）
    let auth_routes = Router::new()
        .route("/api/v1/auth/signup", post(handlers::auth::sign_up))
        .route("/api/v1/auth/signin", post(handlers::auth::sign_in))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh))
        .route("/api/v1/auth/signout", post(handlers::auth::sign_out));

    // 需要有效会话的路由
    let authenticated_routes = Router::new()
        .route(
            "/api/v1/auth/me",
            get(handlers::auth::get_current_user).delete(handlers::auth::close_account),
        )
        .route("/api/v1/auth/password", put(handlers::auth::change_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .fallback(handlers::auth::fallback)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
