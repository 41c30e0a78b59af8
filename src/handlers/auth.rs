//! 认证相关的 HTTP 处理器

use super::extract::ValidJson;
use crate::{
    auth::{
        cookie::{
            access_cookie, clear_cookie, get_cookie, refresh_cookie, ACCESS_COOKIE_NAME,
            REFRESH_COOKIE_NAME,
        },
        extract_token, AuthContext,
    },
    error::AppError,
    middleware::AppState,
    models::{
        auth::{
            ChangePasswordRequest, CurrentUserResponse, SignInRequest, SignUpRequest, TokenPair,
        },
        response::ApiResponse,
    },
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use std::sync::Arc;

type CookieHeaders = AppendHeaders<[(header::HeaderName, String); 2]>;

fn token_cookies(tokens: &TokenPair, secure: bool) -> CookieHeaders {
    AppendHeaders([
        (header::SET_COOKIE, access_cookie(&tokens.access_token, secure)),
        (header::SET_COOKIE, refresh_cookie(&tokens.refresh_token, secure)),
    ])
}

fn cleared_cookies(secure: bool) -> CookieHeaders {
    AppendHeaders([
        (header::SET_COOKIE, clear_cookie(ACCESS_COOKIE_NAME, secure)),
        (header::SET_COOKIE, clear_cookie(REFRESH_COOKIE_NAME, secure)),
    ])
}

/// 注册
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.sign_up(req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::message("Sign-up successfully!"))))
}

/// 登录
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.sign_in(req).await?;
    let cookies = token_cookies(&response.tokens, state.config.security.cookie_secure);

    Ok((cookies, Json(ApiResponse::success("Sign-in successfully!", response))))
}

/// 刷新令牌（从 Cookie 读取刷新令牌）
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME);

    let tokens = state.auth_service.refresh(refresh_token.as_deref()).await?;
    let cookies = token_cookies(&tokens, state.config.security.cookie_secure);

    Ok((cookies, Json(ApiResponse::success("Refresh token successfully", tokens))))
}

/// 登出
///
/// 只要求访问令牌本身有效，不要求会话仍然存在，因此重复登出不会报错。
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = extract_token(&headers);
    let claims = state.auth_guard.identify(token.as_deref())?;

    state.auth_service.sign_out(claims.sub).await?;

    Ok((
        cleared_cookies(state.config.security.cookie_secure),
        Json(ApiResponse::message("Logout successfully")),
    ))
}

/// 获取当前用户信息
pub async fn get_current_user(auth_context: AuthContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(ApiResponse::success(
        "User data retrieved successfully",
        CurrentUserResponse {
            user: auth_context.user,
        },
    )))
}

/// 修改密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .change_password(auth_context.user.id, req)
        .await?;

    Ok((
        cleared_cookies(state.config.security.cookie_secure),
        Json(ApiResponse::message("Password updated")),
    ))
}

/// 注销账户
pub async fn close_account(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.close_account(auth_context.user.id).await?;

    Ok((
        cleared_cookies(state.config.security.cookie_secure),
        Json(ApiResponse::message("User deleted")),
    ))
}

/// 未匹配的路由
pub async fn fallback() -> AppError {
    AppError::RouteNotFound
}
