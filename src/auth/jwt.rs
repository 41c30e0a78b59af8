//! Signed session tokens (HS256 JWT)
//! Access tokens carry no nonce; refresh tokens carry a fresh random one.

use super::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
use crate::{config::AppConfig, error::AppError, models::auth::TokenPair};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const NONCE_BYTES: usize = 32;

/// Token claims. Payloads with any other field are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// Present on refresh tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl TokenClaims {
    pub fn is_refresh(&self) -> bool {
        self.nonce.is_some()
    }
}

/// Token verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::MalformedToken | TokenError::InvalidSignature => AppError::InvalidToken,
            TokenError::Expired => AppError::Expired,
        }
    }
}

/// Signs and verifies tokens with the process-wide secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &Secret<String>) -> Result<Self, AppError> {
        let secret = secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Create token codec from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(&config.security.jwt_secret)
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Verify against the current clock
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as of `now` (epoch seconds). A token whose `exp` is at or
    /// before `now` is expired.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::MalformedToken);
        }

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    _ => TokenError::MalformedToken,
                }
            })?
            .claims;

        if claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Claims for an access token issued at `now`
    pub fn access_claims(user_id: Uuid, now: i64) -> TokenClaims {
        TokenClaims {
            sub: user_id,
            iat: now,
            exp: now + ACCESS_TOKEN_TTL_SECS,
            nonce: None,
        }
    }

    /// Claims for a refresh token issued at `now`, with a new nonce
    pub fn refresh_claims(user_id: Uuid, now: i64) -> TokenClaims {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        TokenClaims {
            sub: user_id,
            iat: now,
            exp: now + REFRESH_TOKEN_TTL_SECS,
            nonce: Some(URL_SAFE_NO_PAD.encode(bytes)),
        }
    }

    /// Generate token pair
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        self.issue_pair_at(user_id, Utc::now().timestamp())
    }

    pub fn issue_pair_at(&self, user_id: Uuid, now: i64) -> Result<TokenPair, AppError> {
        let access_token = self.sign(&Self::access_claims(user_id, now))?;
        let refresh_token = self.sign(&Self::refresh_claims(user_id, now))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
