//! 认证中间件

use super::{
    cookie::{get_cookie, ACCESS_COOKIE_NAME},
    guard::AuthContext,
};
use crate::{error::AppError, middleware::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

/// 提取访问令牌：优先 Cookie，其次 Authorization 头
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    get_cookie(headers, ACCESS_COOKIE_NAME).or_else(|| {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// 认证中间件 - 必须认证
pub async fn require_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers());

    let auth_context = state
        .auth_guard
        .authenticate(token.as_deref())
        .await
        .map_err(|failure| {
            tracing::debug!(reason = %failure, "Authentication failed");
            AppError::from(failure)
        })?;

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        assert_eq!(extract_token(&headers), Some("test_token_123".to_string()));
    }

    #[test]
    fn test_cookie_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer from_header".parse().unwrap());
        headers.insert("cookie", "accessToken=from_cookie".parse().unwrap());

        assert_eq!(extract_token(&headers), Some("from_cookie".to_string()));
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());
    }

    #[test]
    fn test_extract_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "InvalidFormat".parse().unwrap());

        assert!(extract_token(&headers).is_none());
    }
}
