//! 认证服务：注册、登录、令牌刷新、登出

use crate::{
    auth::{jwt::TokenCodec, password::CredentialHasher},
    error::AppError,
    models::{
        auth::{ChangePasswordRequest, SignInRequest, SignInResponse, SignUpRequest, TokenPair},
        user::UserResponse,
    },
    repository::{SessionStore, UserDirectory},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionStore>,
    codec: Arc<TokenCodec>,
    hasher: CredentialHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionStore>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            users,
            sessions,
            codec,
            hasher: CredentialHasher::new(),
        }
    }

    /// 用户注册（不创建会话）
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<UserResponse, AppError> {
        if self.users.find_by_username(&req.username).await?.is_some() {
            tracing::debug!(username = %req.username, "Sign-up rejected: username taken");
            return Err(AppError::UsernameTaken);
        }

        let password_hash = self.hash_password(req.password).await?;

        // 并发注册时由唯一约束兜底
        let user = self.users.create(&req.username, &password_hash).await?;

        metrics::counter!("auth_sign_up_total").increment(1);
        tracing::info!(user_id = %user.id, "User signed up");

        Ok(UserResponse::from(user))
    }

    /// 用户登录
    pub async fn sign_in(&self, req: SignInRequest) -> Result<SignInResponse, AppError> {
        let user = self
            .users
            .find_by_username(&req.username)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !self
            .verify_password(req.password, user.password_hash.clone())
            .await?
        {
            metrics::counter!("auth_sign_in_total", "outcome" => "invalid_credentials")
                .increment(1);
            tracing::warn!(user_id = %user.id, "Sign-in failed: invalid credentials");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.codec.issue_pair(user.id)?;

        self.sessions
            .upsert(user.id, &tokens.access_token, &tokens.refresh_token)
            .await?;

        metrics::counter!("auth_sign_in_total", "outcome" => "success").increment(1);
        tracing::info!(user_id = %user.id, "User signed in");

        Ok(SignInResponse {
            user: UserResponse::from(user),
            tokens,
        })
    }

    /// 刷新令牌（轮换整对令牌）
    ///
    /// 只有当前存储的刷新令牌可以换取新令牌，旧令牌在轮换后即失效。
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair, AppError> {
        let refresh_token = refresh_token.ok_or(AppError::MissingToken)?;

        let claims = self.codec.verify(refresh_token)?;
        if !claims.is_refresh() {
            return Err(AppError::InvalidToken);
        }

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let session = self
            .sessions
            .find_by_user_id(user.id)
            .await?
            .ok_or(AppError::SessionRevoked)?;

        if session.refresh_token != refresh_token {
            tracing::warn!(user_id = %user.id, "Refresh rejected: token superseded");
            return Err(AppError::SessionRevoked);
        }

        let tokens = self.codec.issue_pair(user.id)?;

        self.sessions
            .upsert(user.id, &tokens.access_token, &tokens.refresh_token)
            .await?;

        metrics::counter!("auth_refresh_total").increment(1);
        tracing::info!(user_id = %user.id, "Session refreshed");

        Ok(tokens)
    }

    /// 登出（删除会话，可重复调用）
    pub async fn sign_out(&self, user_id: Uuid) -> Result<(), AppError> {
        self.sessions.delete_by_user_id(user_id).await?;

        tracing::info!(user_id = %user_id, "User signed out");
        Ok(())
    }

    /// 修改密码，成功后会话失效需重新登录
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !self
            .verify_password(req.old_password, user.password_hash.clone())
            .await?
        {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = self.hash_password(req.new_password).await?;

        if !self.users.update_password(user.id, &password_hash).await? {
            return Err(AppError::UserNotFound);
        }

        self.sessions.delete_by_user_id(user.id).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// 注销账户
    pub async fn close_account(&self, user_id: Uuid) -> Result<(), AppError> {
        if !self.users.delete(user_id).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "Account closed");
        Ok(())
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
    }
}
