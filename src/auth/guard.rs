//! Request-time authentication
//!
//! Steps run strictly in order and the first failure ends the check:
//! token present → token verifies → stored session matches → user exists.

use super::jwt::{TokenClaims, TokenCodec, TokenError};
use crate::{
    error::AppError,
    models::user::UserResponse,
    repository::{SessionStore, UserDirectory},
};
use std::sync::Arc;
use thiserror::Error;

/// Why a request could not be authenticated
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("access token is missing")]
    MissingToken,

    #[error("access token is invalid")]
    InvalidToken,

    #[error("access token has expired")]
    Expired,

    #[error("session is no longer active")]
    SessionRevoked,

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<TokenError> for AuthFailure {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::MalformedToken | TokenError::InvalidSignature => AuthFailure::InvalidToken,
            TokenError::Expired => AuthFailure::Expired,
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::MissingToken => AppError::MissingToken,
            AuthFailure::InvalidToken => AppError::InvalidToken,
            AuthFailure::Expired => AppError::Expired,
            AuthFailure::SessionRevoked => AppError::SessionRevoked,
            AuthFailure::UserNotFound => AppError::UserNotFound,
            AuthFailure::Store(e) => e,
        }
    }
}

/// Authenticated caller, placed in request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: UserResponse,
    pub claims: TokenClaims,
}

pub struct AuthGuard {
    codec: Arc<TokenCodec>,
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserDirectory>,
}

impl AuthGuard {
    pub fn new(
        codec: Arc<TokenCodec>,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            codec,
            sessions,
            users,
        }
    }

    /// Cryptographic check only: presence, signature, expiry, token class.
    pub fn identify(&self, token: Option<&str>) -> Result<TokenClaims, AuthFailure> {
        let token = token.ok_or(AuthFailure::MissingToken)?;
        let claims = self.codec.verify(token)?;

        // refresh tokens are never accepted as access tokens
        if claims.is_refresh() {
            return Err(AuthFailure::InvalidToken);
        }

        Ok(claims)
    }

    /// Full check. The stored session is authoritative: a token that verifies
    /// but is not the user's current access token is revoked.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<AuthContext, AuthFailure> {
        let claims = self.identify(token)?;

        let session = self
            .sessions
            .find_by_user_id(claims.sub)
            .await?
            .ok_or(AuthFailure::SessionRevoked)?;

        if Some(session.access_token.as_str()) != token {
            return Err(AuthFailure::SessionRevoked);
        }

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthFailure::UserNotFound)?;

        Ok(AuthContext {
            user: UserResponse::from(user),
            claims,
        })
    }
}
